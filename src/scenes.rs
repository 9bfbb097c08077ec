//! Built-in scene catalogue. Each scene builds a [`World`], a [`Camera`],
//! and the background color the tracer should fall back to when a ray
//! escapes the scene entirely.

use rand::Rng;

use crate::aabb::Aabb;
use crate::camera::{Camera, CameraConfig};
use crate::config::SKY_BACKGROUND;
use crate::error::RenderError;
use crate::material::Material;
use crate::math::{Color, Point3, Vec3};
use crate::primitive::{ConstantMedium, Primitive};
use crate::rng;
use crate::texture::Texture;
use crate::transform::Transform;
use crate::world::{Object, World};

pub struct Scene {
    pub world: World,
    pub camera: Camera,
    pub background: Color,
}

pub fn build(name: &str, image_width: u32) -> Result<Scene, RenderError> {
    match name {
        "showcase" => Ok(showcase(image_width)),
        "cornell" => Ok(cornell_box(image_width)),
        "minimal" => Ok(minimal(image_width)),
        "quads" => Ok(quads(image_width)),
        "fog" => Ok(fog(image_width)),
        other => Err(RenderError::UnknownScene { name: other.to_string() }),
    }
}

fn push_sphere(
    objects: &mut Vec<Object>,
    materials: &mut Vec<Material>,
    textures: &mut Vec<Texture>,
    center: Point3,
    radius: f64,
    material: Material,
    texture: Texture,
) {
    objects.push(Object::new(Primitive::Sphere {
        center1: center,
        motion: Vec3::zero(),
        radius,
    }));
    materials.push(material);
    textures.push(texture);
}

/// The classic "random spheres on a checkerboard" showcase, with three hero
/// spheres (glass, lambertian, metal) in front.
fn showcase(image_width: u32) -> Scene {
    let mut objects = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();

    let ground_checker = Texture::checker(0.32, Texture::solid(Color::new(0.2, 0.3, 0.1)), Texture::solid(Color::new(0.9, 0.9, 0.9)));
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::Lambertian,
        ground_checker,
    );

    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Material::Dielectric { ior: 1.5 },
        Texture::solid(Color::ones()),
    );
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::Lambertian,
        Texture::solid(Color::new(0.4, 0.2, 0.1)),
    );
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Material::Metal { fuzz: 0.0 },
        Texture::solid(Color::new(0.7, 0.6, 0.5)),
    );

    rng::with_thread_rng(|rng| {
        for a in -8..8 {
            for b in -8..8 {
                let center = Point3::new(a as f64 + 0.9 * rng.gen::<f64>(), 0.2, b as f64 + 0.9 * rng.gen::<f64>());
                if [
                    Point3::new(4.0, 0.2, 0.0),
                    Point3::new(-4.0, 0.2, 0.0),
                    Point3::new(0.0, 0.2, 0.0),
                ]
                .iter()
                .any(|p| (center - *p).length() < 0.9)
                {
                    continue;
                }

                let choose: f64 = rng.gen();
                let (material, texture) = if choose < 0.7 {
                    let albedo = Color::new(rng.gen::<f64>() * rng.gen::<f64>(), rng.gen::<f64>() * rng.gen::<f64>(), rng.gen::<f64>() * rng.gen::<f64>());
                    (Material::Lambertian, Texture::solid(albedo))
                } else if choose < 0.9 {
                    let albedo = Color::new(rng.gen_range(0.5..1.0), rng.gen_range(0.5..1.0), rng.gen_range(0.5..1.0));
                    (Material::Metal { fuzz: rng.gen_range(0.0..0.3) }, Texture::solid(albedo))
                } else {
                    (Material::Dielectric { ior: 1.5 }, Texture::solid(Color::ones()))
                };
                push_sphere(&mut objects, &mut materials, &mut textures, center, 0.2, material, texture);
            }
        }
    });

    let world = World::build(objects, materials, textures, Vec::new());
    let camera = Camera::new(&CameraConfig {
        look_from: Point3::new(13.0, 2.0, 3.0),
        look_at: Point3::new(0.0, 0.5, 0.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 20.0,
        aspect_ratio: 16.0 / 9.0,
        image_width,
        defocus_angle: 0.6,
        focus_dist: 10.0,
    });

    Scene {
        world,
        camera,
        background: SKY_BACKGROUND,
    }
}

fn push_quad(
    objects: &mut Vec<Object>,
    materials: &mut Vec<Material>,
    textures: &mut Vec<Texture>,
    q: Point3,
    u: Vec3,
    v: Vec3,
    material: Material,
    texture: Texture,
) {
    objects.push(Object::new(Primitive::Quad { q, u, v }));
    materials.push(material);
    textures.push(texture);
}

/// A Cornell-box-style room: five lambertian quad walls, an area light on
/// the ceiling, one lambertian box and one dielectric sphere.
fn cornell_box(image_width: u32) -> Scene {
    let mut objects = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();

    let red = Texture::solid(Color::new(0.65, 0.05, 0.05));
    let white = Texture::solid(Color::new(0.73, 0.73, 0.73));
    let green = Texture::solid(Color::new(0.12, 0.45, 0.15));
    let light = Texture::solid(Color::new(15.0, 15.0, 15.0));

    push_quad(&mut objects, &mut materials, &mut textures, Point3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), Material::Lambertian, green);
    push_quad(&mut objects, &mut materials, &mut textures, Point3::zero(), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), Material::Lambertian, red);
    push_quad(&mut objects, &mut materials, &mut textures, Point3::new(343.0, 554.0, 332.0), Vec3::new(-130.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -105.0), Material::DiffuseLight, light);
    push_quad(&mut objects, &mut materials, &mut textures, Point3::zero(), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), Material::Lambertian, white.clone());
    push_quad(&mut objects, &mut materials, &mut textures, Point3::new(555.0, 555.0, 555.0), Vec3::new(-555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -555.0), Material::Lambertian, white.clone());
    push_quad(&mut objects, &mut materials, &mut textures, Point3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Material::Lambertian, white.clone());

    objects.push(Object::with_transforms(
        Primitive::Box {
            bbox: Aabb::new(Point3::zero(), Point3::new(165.0, 330.0, 165.0)),
        },
        vec![Transform::rotate_y(15.0), Transform::Translate(Vec3::new(265.0, 0.0, 295.0))],
    ));
    materials.push(Material::Lambertian);
    textures.push(white);

    push_sphere(&mut objects, &mut materials, &mut textures, Point3::new(190.0, 90.0, 190.0), 90.0, Material::Dielectric { ior: 1.5 }, Texture::solid(Color::ones()));

    let world = World::build(objects, materials, textures, Vec::new());
    let camera = Camera::new(&CameraConfig {
        look_from: Point3::new(278.0, 278.0, -800.0),
        look_at: Point3::new(278.0, 278.0, 0.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 40.0,
        aspect_ratio: 1.0,
        image_width,
        defocus_angle: 0.0,
        focus_dist: 800.0,
    });

    Scene {
        world,
        camera,
        background: Color::zero(),
    }
}

/// A single chrome sphere over a checkerboard ground, fast to render,
/// useful as a smoke test.
fn minimal(image_width: u32) -> Scene {
    let mut objects = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();

    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        Material::Lambertian,
        Texture::checker(0.5, Texture::solid(Color::new(0.1, 0.1, 0.1)), Texture::solid(Color::new(0.9, 0.9, 0.9))),
    );
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(0.0, 0.5, -1.0),
        0.5,
        Material::Metal { fuzz: 0.0 },
        Texture::solid(Color::new(0.95, 0.95, 0.97)),
    );
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(-1.2, 0.25, -0.5),
        0.25,
        Material::Lambertian,
        Texture::solid(Color::new(0.9, 0.2, 0.1)),
    );
    push_sphere(
        &mut objects,
        &mut materials,
        &mut textures,
        Point3::new(1.0, 0.3, -0.8),
        0.3,
        Material::Dielectric { ior: 1.5 },
        Texture::solid(Color::ones()),
    );

    let world = World::build(objects, materials, textures, Vec::new());
    let camera = Camera::new(&CameraConfig {
        look_from: Point3::new(0.0, 1.5, 2.0),
        look_at: Point3::new(0.0, 0.3, -1.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 40.0,
        aspect_ratio: 16.0 / 9.0,
        image_width,
        defocus_angle: 0.0,
        focus_dist: 3.0,
    });

    Scene {
        world,
        camera,
        background: SKY_BACKGROUND,
    }
}

/// Six axis-aligned quads facing the camera from every direction, a
/// standard exercise for quad-hit and UV correctness.
fn quads(image_width: u32) -> Scene {
    let mut objects = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();

    let faces = [
        (Point3::new(-3.0, -2.0, 5.0), Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 4.0, 0.0), Color::new(1.0, 0.2, 0.2)),
        (Point3::new(-2.0, -2.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), Color::new(0.2, 1.0, 0.2)),
        (Point3::new(3.0, -2.0, 1.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 4.0, 0.0), Color::new(0.2, 0.2, 1.0)),
        (Point3::new(-2.0, 3.0, 1.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), Color::new(1.0, 0.5, 0.0)),
        (Point3::new(-2.0, -3.0, 5.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0), Color::new(0.2, 0.8, 0.8)),
    ];

    for (q, u, v, color) in faces {
        push_quad(&mut objects, &mut materials, &mut textures, q, u, v, Material::Lambertian, Texture::solid(color));
    }

    let world = World::build(objects, materials, textures, Vec::new());
    let camera = Camera::new(&CameraConfig {
        look_from: Point3::new(0.0, 0.0, 9.0),
        look_at: Point3::zero(),
        vup: Vec3::unit_y(),
        vfov_degrees: 80.0,
        aspect_ratio: 1.0,
        image_width,
        defocus_angle: 0.0,
        focus_dist: 9.0,
    });

    Scene {
        world,
        camera,
        background: SKY_BACKGROUND,
    }
}

/// A unit-density constant medium enclosing the camera, used to exercise
/// participating-media dispersion.
fn fog(image_width: u32) -> Scene {
    let mut objects = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();

    objects.push(Object::new(Primitive::Box {
        bbox: Aabb::new(Point3::new(-50.0, -50.0, -50.0), Point3::new(50.0, 50.0, 50.0)),
    }));
    materials.push(Material::Isotropic);
    textures.push(Texture::solid(Color::new(1.0, 1.0, 1.0)));

    push_sphere(&mut objects, &mut materials, &mut textures, Point3::new(0.0, -1000.0, 0.0), 1000.0, Material::Lambertian, Texture::solid(Color::new(0.5, 0.5, 0.5)));

    let media = vec![ConstantMedium::new(0, 1.0, Color::new(1.0, 1.0, 1.0))];

    let world = World::build(objects, materials, textures, media);
    let camera = Camera::new(&CameraConfig {
        look_from: Point3::new(0.0, 2.0, 10.0),
        look_at: Point3::zero(),
        vup: Vec3::unit_y(),
        vfov_degrees: 40.0,
        aspect_ratio: 16.0 / 9.0,
        image_width,
        defocus_angle: 0.0,
        focus_dist: 10.0,
    });

    Scene {
        world,
        camera,
        background: SKY_BACKGROUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scene_name_is_an_error() {
        assert!(build("nonexistent", 200).is_err());
    }

    #[test]
    fn every_catalogue_scene_builds_without_panicking() {
        for name in ["showcase", "cornell", "minimal", "quads", "fog"] {
            assert!(build(name, 200).is_ok(), "scene {name} failed to build");
        }
    }

    #[test]
    fn image_width_is_honored_by_every_scene() {
        for name in ["showcase", "cornell", "minimal", "quads", "fog"] {
            let scene = build(name, 123).unwrap();
            assert_eq!(scene.camera.image_width, 123, "scene {name} ignored requested width");
        }
    }
}
