//! Path integrator.
//!
//! Each path alternates trace, surface evaluation, Russian roulette and
//! scattering until it escapes to the sky, is killed, or reaches the maximum
//! depth. Killed and exhausted paths take one last step: the scattered ray is
//! traced once more and contributes sky radiance on a miss or emission on a hit.
//!
//! Killed paths still collect that next contribution, so survivors of the
//! roulette are reweighted by `1 / p` only after it, from the next surface
//! onwards. The weight is kept out of the albedo since specular branches
//! ignore albedo.
//!
//! The shape hit by the previous bounce is excluded from the next trace,
//! except when the new ray heads into a sphere (refraction or internal
//! reflection).

use lux_core::{Color, Scene, ShapeId};
use lux_math::{Ray, Vec3};
use noise::Perlin;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::{
    bsdf, evaluate_surface, gen_f32, intersect, primary_ray, sky_radiance, RenderResult,
    RenderSettings, RenderState,
};

/// Color the highlighted shape's albedo is blended towards.
pub const HIGHLIGHT_TINT: Color = Color::new(1.0, 0.45, 0.0);

/// Distance a scattered ray's origin is pushed off the surface.
const SURFACE_OFFSET: f32 = 1e-4;

/// Seed for the random stream of one pixel sample.
///
/// Streams differ per pixel and per sample index, so every pass is
/// reproducible regardless of thread scheduling. The base seed is hashed
/// before mixing so neighbouring seeds do not share shifted streams.
#[inline]
pub fn pixel_seed(base: u64, sample: u32, pixel: usize) -> u64 {
    let index = ((sample as u64) << 32) | (pixel as u64 & 0xffff_ffff);
    splitmix64(splitmix64(base) ^ index)
}

/// SplitMix64 finalizer.
#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Probability that Russian roulette lets a path continue past a surface.
#[inline]
pub fn survival_probability(albedo: Color) -> f32 {
    albedo.max_element().min(1.0).max(0.0)
}

/// The path tracing kernel.
#[derive(Debug, Clone)]
pub struct Renderer {
    settings: RenderSettings,
    noise: Perlin,
}

impl Renderer {
    /// Create a renderer after validating its settings.
    pub fn new(settings: RenderSettings) -> RenderResult<Self> {
        settings.validate()?;
        let noise = Perlin::new(settings.seed as u32);
        Ok(Self { settings, noise })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Radiance seen by an escaped ray.
    #[inline]
    fn environment(&self, scene: &Scene, direction: Vec3) -> Color {
        if self.settings.sky_enabled {
            sky_radiance(scene.sky(), direction, self.settings.sun_enabled)
        } else {
            Color::ZERO
        }
    }

    /// Estimate the radiance arriving along `ray`.
    pub fn trace(&self, scene: &Scene, ray: Ray, rng: &mut dyn RngCore) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = ray;
        let mut last_hit: Option<ShapeId> = None;
        // 1 / p of the last roulette survived, applied after the next emission
        let mut roulette_weight = 1.0_f32;

        for depth in 0..self.settings.max_depth {
            let Some(hit) = intersect(scene, &ray, last_hit) else {
                return radiance + throughput * self.environment(scene, ray.direction());
            };

            let record = scene.shape(hit.shape);
            let surface = evaluate_surface(scene, &ray, &hit, self.settings.shading, &self.noise);
            let mut albedo = scene.texture(record.albedo).sample(surface.uv);
            if self.settings.highlight == Some(hit.shape) {
                albedo = albedo.lerp(HIGHLIGHT_TINT, 0.5);
            }

            radiance += throughput * record.emission;
            throughput *= std::mem::replace(&mut roulette_weight, 1.0);

            let mut survived = true;
            if depth >= self.settings.russian_roulette_depth {
                let p = survival_probability(albedo);
                if gen_f32(rng) >= p {
                    survived = false;
                } else {
                    roulette_weight = 1.0 / p;
                }
            }

            let direction = ray.direction().normalize();
            let scattered = bsdf::scatter(
                scene.material(record.material),
                direction,
                surface.normal,
                albedo,
                rng,
            );
            throughput *= scattered.weight;

            let side = if scattered.direction.dot(surface.normal) >= 0.0 {
                surface.normal
            } else {
                -surface.normal
            };
            ray = Ray::new(surface.point + side * SURFACE_OFFSET, scattered.direction);
            // A flat shape cannot be hit again by a ray leaving it. A sphere
            // can, but only by rays travelling through its interior.
            last_hit = (record.shape.is_flat() || side == surface.normal).then_some(hit.shape);

            if !survived {
                break;
            }
        }

        match intersect(scene, &ray, last_hit) {
            None => radiance + throughput * self.environment(scene, ray.direction()),
            Some(hit) => radiance + throughput * scene.shape(hit.shape).emission,
        }
    }

    /// One jittered sample for pixel `pixel` (row-major index).
    ///
    /// `sample` selects the random stream; pass the number of samples the
    /// pixel has accumulated so far.
    pub fn sample_pixel(&self, scene: &Scene, pixel: usize, sample: u32) -> Color {
        let camera = scene.camera();
        let width = camera.width as usize;
        let (x, y) = ((pixel % width) as u32, (pixel / width) as u32);

        let mut rng = StdRng::seed_from_u64(pixel_seed(self.settings.seed, sample, pixel));
        let ray = primary_ray(camera, x, y, &mut rng);
        self.trace(scene, ray, &mut rng)
    }

    /// Render one sample of a single pixel into `state`.
    ///
    /// The sample is traced without holding the state lock. Returns
    /// `Ok(false)` if the state was reset meanwhile and the sample dropped.
    pub fn render_pixel(&self, scene: &Scene, state: &RenderState, pixel: usize) -> RenderResult<bool> {
        let (ticket, sample) = state.begin_pixel(pixel)?;
        let color = self.sample_pixel(scene, pixel, sample);
        state.commit_pixel(ticket, pixel, color)
    }
}
