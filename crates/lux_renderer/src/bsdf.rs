//! Material scattering.
//!
//! Each material samples one outgoing direction and returns the weight the
//! path throughput is multiplied by. The estimators are already divided by
//! their sampling pdf, so no pdf is returned.

use std::f32::consts::PI;

use lux_core::{Color, Material};
use lux_math::{Onb, Vec3};
use rand::RngCore;

use crate::gen_f32;

/// A sampled scattering event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Unit outgoing direction
    pub direction: Vec3,
    /// Throughput multiplier
    pub weight: Color,
    /// True if the direction crossed the surface (refraction)
    pub transmitted: bool,
}

/// Reflect `v` about the normal `n`: `v - 2 (v . n) n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `v` through a surface with unit normal `n` facing
/// against `v`, where `eta` is the ratio of the origin and destination
/// indices. Returns `None` on total internal reflection.
#[inline]
pub fn refract(v: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-v).dot(n).min(1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some((eta * v + (eta * cos_i - cos_t) * n).normalize())
}

/// Schlick's approximation of Fresnel reflectance between indices `n1` and `n2`.
#[inline]
pub fn schlick(cosine: f32, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine.clamp(0.0, 1.0)).powi(5)
}

/// Probabilities and weights for choosing between the reflected and the
/// transmitted branch of a dielectric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelBranch {
    pub reflect_probability: f32,
    pub transmit_probability: f32,
    /// `R / P`
    pub reflect_weight: f32,
    /// `(1 - R) / (1 - P)`
    pub transmit_weight: f32,
}

/// Reflect with probability `P = 0.25 + 0.5 R`, which keeps both branches
/// sampled even for extreme reflectances.
#[inline]
pub fn fresnel_branch(reflectance: f32) -> FresnelBranch {
    let r = reflectance.clamp(0.0, 1.0);
    let p = 0.25 + 0.5 * r;
    FresnelBranch {
        reflect_probability: p,
        transmit_probability: 1.0 - p,
        reflect_weight: r / p,
        transmit_weight: (1.0 - r) / (1.0 - p),
    }
}

/// Cosine-weighted direction in the hemisphere around `normal`.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let r = r1.sqrt();
    let phi = 2.0 * PI * r2;
    let local = Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r1).max(0.0).sqrt());
    Onb::from_w(normal).to_world(local)
}

/// Direction in a Phong lobe around `axis`: `cos theta = (1 - xi)^(1 / (n + 1))`.
pub fn phong_lobe(axis: Vec3, exponent: f32, rng: &mut dyn RngCore) -> Vec3 {
    let cos_theta = (1.0 - gen_f32(rng)).powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    Onb::from_w(axis).to_world(local)
}

/// Sample the material at a surface.
///
/// `direction` is the unit incoming ray direction and `normal` the unit
/// outward shading normal.
pub fn scatter(
    material: &Material,
    direction: Vec3,
    normal: Vec3,
    albedo: Color,
    rng: &mut dyn RngCore,
) -> Scatter {
    let entering = direction.dot(normal) < 0.0;
    // Normal on the side the ray arrives from
    let n = if entering { normal } else { -normal };

    let reflected = |weight: Color| Scatter {
        direction: reflect(direction, n).normalize(),
        weight,
        transmitted: false,
    };

    match *material {
        Material::Lambertian => Scatter {
            direction: cosine_hemisphere(n, rng),
            weight: albedo,
            transmitted: false,
        },

        Material::Phong { exponent } => {
            let mut out = phong_lobe(reflect(direction, n), exponent, rng);
            // Fold samples that dipped below the surface back above it
            if out.dot(n) < 0.0 {
                out = reflect(out, n);
            }
            Scatter {
                direction: out.normalize(),
                weight: albedo,
                transmitted: false,
            }
        }

        Material::Mirror => reflected(albedo),

        Material::Glass { ior } => {
            let (n1, n2) = if entering { (1.0, ior) } else { (ior, 1.0) };
            let Some(refracted) = refract(direction, n, n1 / n2) else {
                return reflected(Color::ONE);
            };

            let cos_i = (-direction).dot(n);
            // Use the angle on the optically thinner side
            let cosine = if n1 <= n2 { cos_i } else { (-refracted).dot(n).abs() };
            let branch = fresnel_branch(schlick(cosine, n1, n2));

            if gen_f32(rng) < branch.reflect_probability {
                reflected(Color::splat(branch.reflect_weight))
            } else {
                Scatter {
                    direction: refracted,
                    weight: Color::splat(branch.transmit_weight),
                    transmitted: true,
                }
            }
        }

        Material::ClearCoat { ior } => {
            let (n1, n2) = if entering { (1.0, ior) } else { (ior, 1.0) };
            let Some(refracted) = refract(direction, n, n1 / n2) else {
                return reflected(Color::ONE);
            };

            let cos_i = (-direction).dot(n);
            let cosine = if n1 <= n2 { cos_i } else { (-refracted).dot(n).abs() };
            let branch = fresnel_branch(schlick(cosine, n1, n2));

            if gen_f32(rng) < branch.reflect_probability {
                reflected(Color::splat(branch.reflect_weight))
            } else {
                Scatter {
                    direction: cosine_hemisphere(n, rng),
                    weight: albedo * branch.transmit_weight,
                    transmitted: false,
                }
            }
        }
    }
}
