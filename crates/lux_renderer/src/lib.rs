//! LUX Renderer - the per-pixel path tracing kernel.
//!
//! A unidirectional Monte Carlo path tracer over a compiled [`lux_core::Scene`]:
//! - Stackless BVH traversal plus a linear pass over planes and spheres
//! - Surface evaluation with normal maps and Perlin bump mapping
//! - Lambertian, Phong, mirror, glass and clear-coat scattering with
//!   Russian-roulette termination
//! - Perez/Preetham daytime sky with an optional sun disc
//! - Progressive accumulation into a mutex-guarded BGRA display buffer

mod bsdf;
mod bucket;
mod camera;
mod error;
mod integrator;
mod intersect;
mod resolve;
mod settings;
mod sky;
mod state;
mod surface;

pub use bsdf::{
    cosine_hemisphere, fresnel_branch, phong_lobe, reflect, refract, scatter, schlick,
    FresnelBranch, Scatter,
};
pub use bucket::{generate_buckets, render_bucket, render_pass, Bucket, BucketResult};
pub use camera::{pixel_ray, primary_ray};
pub use error::{RenderError, RenderResult};
pub use integrator::{pixel_seed, survival_probability, Renderer, HIGHLIGHT_TINT};
pub use intersect::{
    hit_plane, hit_shape, hit_sphere, hit_triangle, intersect, intersect_linear, Hit, EPSILON,
};
pub use resolve::resolve_pixel;
pub use settings::RenderSettings;
pub use sky::sky_radiance;
pub use state::{FrameBuffers, PassTicket, RenderState};
pub use surface::{evaluate_surface, Shading, SurfaceHit};

/// Re-export common types so callers need only this crate
pub use lux_core::Color;
pub use lux_math::{Ray, Vec2, Vec3};

use rand::{Rng, RngCore};

/// Uniform random number in [0, 1).
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}
