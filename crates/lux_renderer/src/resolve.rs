//! Pixel resolver: accumulated radiance to 8-bit BGRA.

use lux_core::Color;

/// Average `sum` over `samples`, clamp to [0, 1] and quantize to BGRA.
///
/// Channels are truncated, not rounded. NaN resolves to 0.
#[inline]
pub fn resolve_pixel(sum: Color, samples: u32) -> [u8; 4] {
    if samples == 0 {
        return [0, 0, 0, 255];
    }
    let color = sum / samples as f32;
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
    [byte(color.z), byte(color.y), byte(color.x), 255]
}
