//! Sky radiance for escaped rays.

use lux_core::sky::perez_fn;
use lux_core::{Color, SkyParams};
use lux_math::Vec3;

/// Directions are clamped to at least this far above the horizon before the
/// Perez function sees them.
const MIN_COS_THETA: f32 = 0.01;

/// Evaluate the Perez/Preetham sky in `direction`.
///
/// Returns linear RGB. Directions below the horizon of the sky frame are
/// black; `sun` adds the sun disc on top of the sky dome.
pub fn sky_radiance(sky: &SkyParams, direction: Vec3, sun: bool) -> Color {
    let direction = direction.normalize_or_zero();
    let local = sky.basis.to_local(direction);
    if local.z < 0.0 {
        return Color::ZERO;
    }

    let theta = local.z.max(MIN_COS_THETA).acos();
    let cos_gamma = direction.dot(sky.sun_direction).clamp(-1.0, 1.0);
    let gamma = cos_gamma.acos();

    let [luminance, x, y] = std::array::from_fn(|i| {
        sky.zenith[i] * perez_fn(theta, gamma, &sky.perez[i]) / sky.zenith_norm[i]
    });

    let mut rgb = xyy_to_rgb(luminance, x, y);
    let min = rgb.min_element();
    if min < 0.0 {
        rgb += Color::splat(-min);
    }
    rgb *= sky.luminance_scale;

    if sun && cos_gamma >= sky.sun_cos_radius {
        rgb += sky.sun_radiance;
    }
    rgb
}

/// CIE xyY to linear sRGB.
#[inline]
fn xyy_to_rgb(luminance: f32, x: f32, y: f32) -> Color {
    if y <= 0.0 {
        return Color::ZERO;
    }
    let cx = x / y * luminance;
    let cy = luminance;
    let cz = (1.0 - x - y) / y * luminance;

    Color::new(
        3.2406 * cx - 1.5372 * cy - 0.4986 * cz,
        -0.9689 * cx + 1.8758 * cy + 0.0415 * cz,
        0.0557 * cx - 0.2040 * cy + 1.0570 * cz,
    )
}
