//! Perez/Preetham daytime sky parameters.
//!
//! Coefficients depend only on turbidity and sun position, so they are
//! computed once here and recomputed only when either changes. Evaluation per
//! direction lives in the renderer.

use std::f32::consts::PI;

use glam::Vec3;
use lux_math::Onb;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::Color;

/// User-facing sky configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkySettings {
    /// Atmospheric turbidity, roughly 2 (clear) to 10 (hazy)
    pub turbidity: f32,
    /// Direction towards the sun (need not be normalized)
    pub sun_direction: Vec3,
    /// World-space zenith
    pub up: Vec3,
    /// Converts Perez luminance (kcd/m^2) into renderer radiance units
    pub luminance_scale: f32,
    /// Radiance added inside the sun disc
    pub sun_radiance: Color,
    /// Angular radius of the sun disc in radians
    pub sun_angular_radius: f32,
}

impl Default for SkySettings {
    fn default() -> Self {
        Self {
            turbidity: 3.0,
            sun_direction: Vec3::new(0.3, 0.8, 0.5),
            up: Vec3::Y,
            luminance_scale: 0.05,
            sun_radiance: Color::new(60.0, 56.0, 50.0),
            sun_angular_radius: 0.0093,
        }
    }
}

impl SkySettings {
    /// Reject settings that would turn every sky lookup into NaN.
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.up.is_finite() && self.up.length_squared() > 0.0) {
            return Err(SceneError::InvalidSky(format!("up vector {} is degenerate", self.up)));
        }
        if !(self.sun_direction.is_finite() && self.sun_direction.length_squared() > 0.0) {
            return Err(SceneError::InvalidSky(format!(
                "sun direction {} is degenerate",
                self.sun_direction
            )));
        }
        if !(self.turbidity.is_finite() && self.turbidity > 0.0) {
            return Err(SceneError::InvalidSky(format!(
                "turbidity {} must be positive",
                self.turbidity
            )));
        }
        Ok(())
    }
}

/// Precomputed sky model state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyParams {
    /// Perez A..E coefficients for luminance Y, chromaticity x, chromaticity y
    pub perez: [[f32; 5]; 3],
    /// Zenith values (Y, x, y)
    pub zenith: [f32; 3],
    /// Perez function at the zenith for the current sun, per channel
    pub zenith_norm: [f32; 3],
    /// Unit direction towards the sun
    pub sun_direction: Vec3,
    /// Angle between sun and zenith
    pub theta_sun: f32,
    /// Basis whose `w` axis is the local zenith
    pub basis: Onb,
    pub luminance_scale: f32,
    pub sun_radiance: Color,
    /// Cosine of the sun's angular radius
    pub sun_cos_radius: f32,
}

impl SkyParams {
    /// Compute coefficients for the given settings.
    pub fn new(settings: &SkySettings) -> Self {
        let t = settings.turbidity;
        let basis = Onb::from_w(settings.up);
        let sun_direction = settings.sun_direction.normalize();
        let theta_sun = basis.to_local(sun_direction).z.clamp(-1.0, 1.0).acos();

        let perez = [
            [
                0.1787 * t - 1.4630,
                -0.3554 * t + 0.4275,
                -0.0227 * t + 5.3251,
                0.1206 * t - 2.5771,
                -0.0670 * t + 0.3703,
            ],
            [
                -0.0193 * t - 0.2592,
                -0.0665 * t + 0.0008,
                -0.0004 * t + 0.2125,
                -0.0641 * t - 0.8989,
                -0.0033 * t + 0.0452,
            ],
            [
                -0.0167 * t - 0.2608,
                -0.0950 * t + 0.0092,
                -0.0079 * t + 0.2102,
                -0.0441 * t - 1.6537,
                -0.0109 * t + 0.0529,
            ],
        ];

        let zenith = zenith_values(t, theta_sun);
        let zenith_norm = perez.map(|c| perez_fn(0.0, theta_sun, &c));

        log::debug!(
            "Sky: turbidity {:.2}, sun at {:.1} deg from zenith, zenith Y {:.3}",
            t,
            theta_sun.to_degrees(),
            zenith[0]
        );

        Self {
            perez,
            zenith,
            zenith_norm,
            sun_direction,
            theta_sun,
            basis,
            luminance_scale: settings.luminance_scale,
            sun_radiance: settings.sun_radiance,
            sun_cos_radius: settings.sun_angular_radius.cos(),
        }
    }
}

impl Default for SkyParams {
    fn default() -> Self {
        Self::new(&SkySettings::default())
    }
}

/// Perez distribution `(1 + A e^(B / cos theta)) (1 + C e^(D gamma) + E cos^2 gamma)`.
#[inline]
pub fn perez_fn(theta: f32, gamma: f32, [a, b, c, d, e]: &[f32; 5]) -> f32 {
    let cos_gamma = gamma.cos();
    (1.0 + a * (b / theta.cos()).exp()) * (1.0 + c * (d * gamma).exp() + e * cos_gamma * cos_gamma)
}

/// Zenith luminance (kcd/m^2) and chromaticity for turbidity `t` and sun angle `theta_s`.
fn zenith_values(t: f32, theta_s: f32) -> [f32; 3] {
    let chi = (4.0 / 9.0 - t / 120.0) * (PI - 2.0 * theta_s);
    let luminance = (4.0453 * t - 4.9710) * chi.tan() - 0.2155 * t + 2.4192;

    let t2 = t * t;
    let th = [theta_s * theta_s * theta_s, theta_s * theta_s, theta_s, 1.0];
    let dot = |k: [f32; 4]| k[0] * th[0] + k[1] * th[1] + k[2] * th[2] + k[3] * th[3];

    let x = t2 * dot([0.00166, -0.00375, 0.00209, 0.0])
        + t * dot([-0.02903, 0.06377, -0.03202, 0.00394])
        + dot([0.11693, -0.21196, 0.06052, 0.25886]);
    let y = t2 * dot([0.00275, -0.00610, 0.00317, 0.0])
        + t * dot([-0.04214, 0.08970, -0.04153, 0.00516])
        + dot([0.15346, -0.26756, 0.06670, 0.26688]);

    [luminance, x, y]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_sun() {
        let params = SkyParams::new(&SkySettings {
            turbidity: 3.0,
            sun_direction: Vec3::Y,
            ..Default::default()
        });

        assert!(params.theta_sun.abs() < 1e-3);
        assert!(params.zenith[0] > 0.0);
        // Zenith chromaticity of a clear sky is bluish-white, near (0.25..0.35)
        assert!(params.zenith[1] > 0.2 && params.zenith[1] < 0.35);
        assert!(params.zenith[2] > 0.2 && params.zenith[2] < 0.4);
    }

    #[test]
    fn test_perez_normalization_matches_zenith() {
        let params = SkyParams::default();
        for (coeffs, norm) in params.perez.iter().zip(params.zenith_norm) {
            assert!((perez_fn(0.0, params.theta_sun, coeffs) - norm).abs() < 1e-6);
        }
    }

    #[test]
    fn test_turbidity_changes_coefficients() {
        let clear = SkyParams::new(&SkySettings {
            turbidity: 2.0,
            ..Default::default()
        });
        let hazy = SkyParams::new(&SkySettings {
            turbidity: 8.0,
            ..Default::default()
        });
        assert_ne!(clear.perez, hazy.perez);
        assert_eq!(clear.sun_direction, hazy.sun_direction);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: SkySettings = serde_json::from_str(r#"{"turbidity": 5.0}"#).unwrap();
        assert_eq!(settings.turbidity, 5.0);
        assert_eq!(settings.up, Vec3::Y);
    }

    #[test]
    fn test_degenerate_settings_are_rejected() {
        assert!(SkySettings::default().validate().is_ok());
        for settings in [
            SkySettings {
                up: Vec3::ZERO,
                ..Default::default()
            },
            SkySettings {
                sun_direction: Vec3::new(f32::NAN, 1.0, 0.0),
                ..Default::default()
            },
            SkySettings {
                turbidity: 0.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(settings.validate(), Err(SceneError::InvalidSky(_))));
        }
    }
}
