//! CLI argument parsing and the resolved render configuration derived from it.

use clap::Parser;

use crate::error::RenderError;
use crate::math::Color;

/// photon-trace, an offline Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(
    name = "photon-trace",
    version,
    about = "A physically-based offline path tracer",
    after_help = "EXAMPLES:\n  \
                  photon-trace showcase --spp 200 --depth 20 --output render.png\n  \
                  photon-trace cornell --width 600 --threads 8"
)]
pub struct Cli {
    /// Scene to render
    pub scene: String,

    /// Output image width in pixels. Height is derived from the scene's aspect ratio.
    #[arg(short = 'W', long, default_value_t = 600)]
    pub width: u32,

    /// Samples per pixel, higher values reduce noise at the cost of render time
    #[arg(long, default_value_t = 100)]
    pub samples: u32,

    /// Maximum ray bounce depth
    #[arg(long, default_value_t = 50)]
    pub depth: u32,

    /// Worker thread count. Defaults to available hardware parallelism.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: String,

    /// Base RNG seed; worker streams are derived from it
    #[arg(long, default_value_t = 0)]
    pub seed: u32,
}

pub struct RenderConfig {
    pub scene: String,
    pub width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub worker_threads: Option<usize>,
    pub output_path: String,
    pub seed: u32,
}

impl TryFrom<Cli> for RenderConfig {
    type Error = RenderError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.width == 0 {
            return Err(RenderError::InvalidFlag {
                flag: "width",
                reason: "must be greater than zero".to_string(),
            });
        }
        if cli.samples == 0 {
            return Err(RenderError::InvalidFlag {
                flag: "samples",
                reason: "must be greater than zero".to_string(),
            });
        }
        if cli.depth == 0 {
            return Err(RenderError::InvalidFlag {
                flag: "depth",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(RenderConfig {
            scene: cli.scene,
            width: cli.width,
            samples_per_pixel: cli.samples,
            max_depth: cli.depth,
            worker_threads: cli.threads,
            output_path: cli.output,
            seed: cli.seed,
        })
    }
}

/// Background color used when no light or medium is hit. Fixed sky blue;
/// scenes that need a black background (e.g. Cornell-box style enclosed
/// rooms) rely entirely on emissive surfaces instead.
pub const SKY_BACKGROUND: Color = Color::new(0.7, 0.8, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(scene: &str) -> Cli {
        Cli {
            scene: scene.to_string(),
            width: 600,
            samples: 100,
            depth: 50,
            threads: None,
            output: "render.png".to_string(),
            seed: 0,
        }
    }

    #[test]
    fn zero_width_is_rejected() {
        let mut c = cli("showcase");
        c.width = 0;
        assert!(RenderConfig::try_from(c).is_err());
    }

    #[test]
    fn valid_cli_converts_cleanly() {
        let config = RenderConfig::try_from(cli("showcase")).unwrap();
        assert_eq!(config.scene, "showcase");
        assert_eq!(config.width, 600);
    }
}
