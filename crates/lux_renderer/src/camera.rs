//! Primary ray generation.

use std::f32::consts::PI;

use lux_core::Camera;
use lux_math::{Ray, Vec2};
use rand::RngCore;

use crate::gen_f32;

/// Generate a jittered primary ray for pixel (x, y), sampling the lens when
/// the camera has an aperture.
pub fn primary_ray(camera: &Camera, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
    let jitter = Vec2::new(gen_f32(rng), gen_f32(rng));
    let lens = if camera.aperture > 0.0 {
        sample_unit_disk(rng)
    } else {
        Vec2::ZERO
    };
    pixel_ray(camera, x, y, jitter, lens)
}

/// Deterministic ray through pixel (x, y).
///
/// `jitter` is the sub-pixel position in [0, 1)^2 (0.5, 0.5 is the pixel
/// center) and `lens` a point on the unit disk, scaled by the aperture.
/// Pixel rows run top to bottom.
pub fn pixel_ray(camera: &Camera, x: u32, y: u32, jitter: Vec2, lens: Vec2) -> Ray {
    let half_height = (camera.vfov.to_radians() / 2.0).tan();
    let half_width = half_height * camera.aspect();

    let sx = ((x as f32 + jitter.x) / camera.width as f32) * 2.0 - 1.0;
    let sy = 1.0 - ((y as f32 + jitter.y) / camera.height as f32) * 2.0;

    // Direction with unit length along the view axis
    let direction =
        camera.forward + sx * half_width * camera.right + sy * half_height * camera.up;

    if camera.aperture <= 0.0 {
        return Ray::new(camera.eye, direction.normalize());
    }

    let focus = camera.eye + direction * camera.focus_distance;
    let offset = camera.aperture * (lens.x * camera.right + lens.y * camera.up);
    let origin = camera.eye + offset;
    Ray::new(origin, (focus - origin).normalize())
}

/// Uniform point on the unit disk (polar mapping).
fn sample_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    let r = gen_f32(rng).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec2::new(r * phi.cos(), r * phi.sin())
}
