//! Error taxonomy for the renderer core.
//!
//! Config and allocator failures are the only errors that surface to the
//! user; texture load failures degrade to magenta and are only logged (see
//! [`crate::texture::Image::load`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown scene '{name}'")]
    UnknownScene { name: String },

    #[error("invalid value for --{flag}: {reason}")]
    InvalidFlag { flag: &'static str, reason: String },

    #[error("could not load texture image '{path}'")]
    TextureLoad { path: String },

    #[error("failed to write output image to '{path}'")]
    OutputWrite {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
