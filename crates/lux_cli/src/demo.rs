//! Built-in demo scene exercising every material and texture kind.

use image::{Rgb, RgbImage};
use lux_core::{
    Camera, Color, Material, SceneBuilder, Scene, SceneResult, Shape, ShapeRecord, SkySettings,
    Texture,
};
use lux_math::{Vec2, Vec3};

/// Build the demo scene at the given resolution.
pub fn build_scene(width: u32, height: u32, sky: SkySettings) -> SceneResult<Scene> {
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, 2.0, 9.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_lens(35.0, 0.03, 9.0);
    let mut builder = SceneBuilder::new().with_camera(camera).with_sky(sky);

    // Textures
    let checker = builder.add_texture(
        Texture::checkerboard(Color::splat(0.85), Color::splat(0.15), 1.0).with_rotation(30.0),
    );
    let red = builder.add_texture(Texture::solid(Color::new(0.8, 0.2, 0.15)));
    let gold = builder.add_texture(Texture::solid(Color::new(0.9, 0.7, 0.3)));
    let white = builder.add_texture(Texture::solid(Color::ONE));
    let teal = builder.add_texture(Texture::solid(Color::new(0.1, 0.5, 0.5)));
    let bricks = builder.add_texture(Texture::from_rgb_image(&brick_image(64)).with_scale(2.0));
    let bumps = builder.add_texture(Texture::from_rgb_image(&dimple_normal_map(64)));

    // Materials
    let diffuse = builder.add_material(Material::Lambertian);
    let metal = builder.add_material(Material::phong(200.0));
    let mirror = builder.add_material(Material::Mirror);
    let glass = builder.add_material(Material::glass(1.5));
    let coat = builder.add_material(Material::clear_coat(1.5));

    builder.add_shape(ShapeRecord::new(
        Shape::plane(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::X),
        diffuse,
        checker,
    ));
    builder.add_shape(
        ShapeRecord::new(Shape::sphere(Vec3::new(-2.4, 1.0, 0.0), 1.0), diffuse, red)
            .with_bump(0.3, 4.0),
    );
    builder.add_shape(ShapeRecord::new(
        Shape::sphere(Vec3::new(0.0, 1.0, -1.0), 1.0),
        mirror,
        white,
    ));
    builder.add_shape(ShapeRecord::new(
        Shape::sphere(Vec3::new(2.4, 1.0, 0.0), 1.0),
        metal,
        gold,
    ));
    builder.add_shape(ShapeRecord::new(
        Shape::sphere(Vec3::new(0.9, 0.5, 2.0), 0.5),
        glass,
        white,
    ));
    builder.add_shape(ShapeRecord::new(
        Shape::sphere(Vec3::new(-0.9, 0.4, 2.2), 0.4),
        coat,
        teal,
    ));

    // Emissive panel above the scene
    builder.add_shape(
        ShapeRecord::new(
            Shape::sphere(Vec3::new(0.0, 6.0, 3.0), 0.8),
            diffuse,
            white,
        )
        .with_emission(Color::new(8.0, 7.5, 6.5)),
    );

    // Textured, normal-mapped wall from a two-triangle mesh
    let positions = [
        Vec3::new(-4.0, 0.0, -3.0),
        Vec3::new(4.0, 0.0, -3.0),
        Vec3::new(4.0, 3.0, -3.0),
        Vec3::new(-4.0, 3.0, -3.0),
    ];
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 0.4),
        Vec2::new(0.0, 0.4),
    ];
    builder.add_mesh(
        &positions,
        None,
        Some(&uvs[..]),
        &[[0, 1, 2], [0, 2, 3]],
        ShapeRecord::new(Shape::triangle(Vec3::ZERO, Vec3::X, Vec3::Y), diffuse, bricks)
            .with_normal_map(bumps),
    )?;

    builder.build()
}

/// Running-bond brick pattern, `size` x `size` texels.
fn brick_image(size: u32) -> RgbImage {
    let course = (size / 4).max(1);
    let brick = (size / 2).max(1);
    RgbImage::from_fn(size, size, |x, y| {
        let row = y / course;
        let shifted = x + (row % 2) * brick / 2;
        let mortar = y % course == 0 || shifted % brick == 0;
        if mortar {
            Rgb([200, 196, 186])
        } else {
            Rgb([150, 60 + (row as u8 % 3) * 10, 45])
        }
    })
}

/// Tangent-space normal map of a single round dimple.
fn dimple_normal_map(size: u32) -> RgbImage {
    let half = size as f32 / 2.0;
    RgbImage::from_fn(size, size, |x, y| {
        let dx = (x as f32 + 0.5 - half) / half;
        let dy = (y as f32 + 0.5 - half) / half;
        let slope = if dx * dx + dy * dy < 0.8 { 0.5 } else { 0.0 };
        let n = Vec3::new(-dx * slope, -dy * slope, 1.0).normalize();
        let encode = |c: f32| ((c * 0.5 + 0.5) * 255.0) as u8;
        Rgb([encode(n.x), encode(n.y), encode(n.z)])
    })
}
