//! Bucket-based frame passes.
//!
//! Divides the image into tiles (buckets) rendered independently and in
//! parallel with rayon. Pixels share nothing but the read-only scene, and
//! the finished frame is committed to the [`RenderState`] in one locked step.

use std::time::Instant;

use lux_core::{Color, Scene};
use rayon::prelude::*;

use crate::{RenderError, RenderResult, RenderState, Renderer};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets near the center come first so the most important part of the
/// image converges earliest.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let cx = b.x as f32 + b.width as f32 / 2.0;
        let cy = b.y as f32 + b.height as f32 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order within the bucket
    pub pixels: Vec<Color>,
}

/// Render one sample for every pixel of a bucket.
///
/// `samples` holds each pixel's accumulated sample count for the whole
/// frame; it selects the pixel's random stream. Pixels past its end use
/// sample 0.
pub fn render_bucket(
    renderer: &Renderer,
    scene: &Scene,
    bucket: &Bucket,
    samples: &[u32],
) -> BucketResult {
    let width = scene.camera().width as usize;
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let x = (bucket.x + local_x) as usize;
            let y = (bucket.y + local_y) as usize;
            let pixel = y * width + x;
            let sample = samples.get(pixel).copied().unwrap_or(0);
            pixels.push(renderer.sample_pixel(scene, pixel, sample));
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

/// Render one full-frame pass and commit it to `state`.
///
/// Returns `Ok(false)` if the state was reset while the pass was running;
/// its samples are dropped.
pub fn render_pass(renderer: &Renderer, scene: &Scene, state: &RenderState) -> RenderResult<bool> {
    let camera = scene.camera();
    let (width, height) = (camera.width, camera.height);
    if (width, height) != (state.width(), state.height()) {
        return Err(RenderError::BufferSize {
            expected: state.pixel_count(),
            actual: camera.pixel_count(),
        });
    }

    let (ticket, samples) = state.begin_pass();
    let start = Instant::now();

    let buckets = generate_buckets(width, height, renderer.settings().bucket_size);
    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(renderer, scene, bucket, &samples))
        .collect();

    let mut frame = vec![Color::ZERO; camera.pixel_count()];
    for result in &results {
        let b = result.bucket;
        for (row, chunk) in result.pixels.chunks_exact(b.width as usize).enumerate() {
            let offset = (b.y as usize + row) * width as usize + b.x as usize;
            frame[offset..offset + chunk.len()].copy_from_slice(chunk);
        }
    }

    let committed = state.commit_pass(ticket, &frame)?;
    if committed {
        log::debug!(
            "Pass {} finished in {:.1?} ({} buckets)",
            ticket.pass + 1,
            start.elapsed(),
            buckets.len()
        );
    } else {
        log::debug!("Pass {} discarded after reset", ticket.pass + 1);
    }
    Ok(committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderSettings;
    use lux_core::{Camera, Material, SceneBuilder, Shape, ShapeRecord, Texture};
    use lux_math::Vec3;

    fn small_scene(width: u32, height: u32) -> Scene {
        let mut builder = SceneBuilder::new().with_camera(
            Camera::new()
                .with_resolution(width, height)
                .with_position(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y),
        );
        let white = builder.add_texture(Texture::solid(Color::splat(0.7)));
        let diffuse = builder.add_material(Material::Lambertian);
        builder.add_shape(ShapeRecord::new(Shape::sphere(Vec3::ZERO, 1.0), diffuse, white));
        builder.add_shape(ShapeRecord::new(
            Shape::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -1.0, 1.0), Vec3::new(1.0, -1.0, 0.0)),
            diffuse,
            white,
        ));
        builder.build().unwrap()
    }

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4);
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_pass_matches_per_pixel_samples() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene = small_scene(20, 12);
        let renderer = Renderer::new(RenderSettings {
            bucket_size: 7,
            ..Default::default()
        })
        .unwrap();
        let state = RenderState::new(20, 12);

        assert!(render_pass(&renderer, &scene, &state).unwrap());
        assert_eq!(state.passes(), 1);

        let buffers = state.snapshot();
        for pixel in [0, 19, 137, 239] {
            assert_eq!(buffers.accum[pixel], renderer.sample_pixel(&scene, pixel, 0));
        }
        assert!(buffers.samples.iter().all(|&n| n == 1));
        assert_eq!(state.snapshot_display().len(), 20 * 12 * 4);
    }

    #[test]
    fn test_pass_continues_single_pixel_streams() {
        let scene = small_scene(6, 4);
        let renderer = Renderer::new(RenderSettings::default()).unwrap();
        let state = RenderState::new(6, 4);

        assert!(renderer.render_pixel(&scene, &state, 9).unwrap());
        assert!(render_pass(&renderer, &scene, &state).unwrap());

        let buffers = state.snapshot();
        assert_eq!(buffers.samples[9], 2);
        assert_eq!(
            buffers.accum[9],
            renderer.sample_pixel(&scene, 9, 0) + renderer.sample_pixel(&scene, 9, 1)
        );
        assert_eq!(buffers.samples[10], 1);
        assert_eq!(buffers.accum[10], renderer.sample_pixel(&scene, 10, 0));
    }

    #[test]
    fn test_pass_rejects_mismatched_state() {
        let scene = small_scene(8, 8);
        let renderer = Renderer::new(RenderSettings::default()).unwrap();
        let state = RenderState::new(4, 4);
        assert!(render_pass(&renderer, &scene, &state).is_err());
    }
}
