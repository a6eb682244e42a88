//! Texture records and their evaluation.
//!
//! Three kinds exist: a constant color, a procedural checkerboard, and an image
//! stored as a flat array of packed `0x00RRGGBB` pixels. Image decoding is the
//! application's job; [`Texture::from_rgb_image`] packs an already decoded image.

use glam::{Mat2, Vec2};
use image::RgbImage;

use crate::Color;

/// Index of a texture in the scene's texture array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Brightness multipliers used when both checkerboard colors are identical.
pub const CHECKER_DARK: f32 = 0.8;
pub const CHECKER_BRIGHT: f32 = 1.2;

/// Procedural two-color checkerboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkerboard {
    pub even: Color,
    pub odd: Color,
    /// Checks per UV unit
    pub scale: f32,
    /// Rotation applied to UV before scaling, in degrees
    pub rotation_degrees: f32,
}

/// Image texture with packed RGB pixels in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
    /// Repetitions per UV unit
    pub scale: f32,
    /// Rotation applied to UV before scaling, in degrees
    pub rotation_degrees: f32,
}

/// A texture record.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    Solid(Color),
    Checkerboard(Checkerboard),
    Image(ImageTexture),
}

impl Texture {
    /// Create a constant-color texture.
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    /// Create an unrotated checkerboard.
    pub fn checkerboard(even: Color, odd: Color, scale: f32) -> Self {
        Texture::Checkerboard(Checkerboard {
            even,
            odd,
            scale,
            rotation_degrees: 0.0,
        })
    }

    /// Create an image texture from packed `0x00RRGGBB` pixels.
    pub fn image(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        Texture::Image(ImageTexture {
            width,
            height,
            pixels,
            scale: 1.0,
            rotation_degrees: 0.0,
        })
    }

    /// Pack a decoded RGB image.
    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| pack_rgb(p.0)).collect();
        Self::image(width, height, pixels)
    }

    /// Set the UV rotation (degrees) of a checkerboard or image texture.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        match &mut self {
            Texture::Solid(_) => {}
            Texture::Checkerboard(c) => c.rotation_degrees = degrees,
            Texture::Image(i) => i.rotation_degrees = degrees,
        }
        self
    }

    /// Set the UV scale of a checkerboard or image texture.
    pub fn with_scale(mut self, scale: f32) -> Self {
        match &mut self {
            Texture::Solid(_) => {}
            Texture::Checkerboard(c) => c.scale = scale,
            Texture::Image(i) => i.scale = scale,
        }
        self
    }

    /// Evaluate the texture at the given UV coordinates.
    pub fn sample(&self, uv: Vec2) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checkerboard(checker) => checker.sample(uv),
            Texture::Image(image) => image.sample(uv),
        }
    }
}

impl Checkerboard {
    /// Evaluate the checkerboard.
    ///
    /// Two half-plane tests per cell are combined with XOR. When both colors
    /// are equal the result is darkened or brightened instead, so the pattern
    /// stays visible.
    pub fn sample(&self, uv: Vec2) -> Color {
        let st = transform_uv(uv, self.rotation_degrees, self.scale);
        let odd = (st.x.rem_euclid(1.0) < 0.5) ^ (st.y.rem_euclid(1.0) < 0.5);

        if self.even == self.odd {
            let factor = if odd { CHECKER_BRIGHT } else { CHECKER_DARK };
            self.even * factor
        } else if odd {
            self.odd
        } else {
            self.even
        }
    }
}

impl ImageTexture {
    /// Nearest-pixel lookup with wrap-around addressing.
    pub fn sample(&self, uv: Vec2) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::ZERO;
        }
        let st = transform_uv(uv, self.rotation_degrees, self.scale);
        let x = ((st.x * self.width as f32).floor() as i64).rem_euclid(self.width as i64);
        let y = ((st.y * self.height as f32).floor() as i64).rem_euclid(self.height as i64);
        let index = y as usize * self.width as usize + x as usize;

        self.pixels
            .get(index)
            .map(|&packed| unpack_rgb(packed))
            .unwrap_or(Color::ZERO)
    }

    /// Get the packed pixel at integer coordinates, if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Rotate UV by the given angle, then scale.
#[inline]
fn transform_uv(uv: Vec2, rotation_degrees: f32, scale: f32) -> Vec2 {
    if rotation_degrees == 0.0 {
        return uv * scale;
    }
    Mat2::from_angle(rotation_degrees.to_radians()) * uv * scale
}

/// Pack 8-bit RGB into `0x00RRGGBB`.
#[inline]
pub fn pack_rgb([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpack `0x00RRGGBB` into a 0-1 color.
#[inline]
pub fn unpack_rgb(packed: u32) -> Color {
    let r = (packed >> 16) & 0xff;
    let g = (packed >> 8) & 0xff;
    let b = packed & 0xff;
    Color::new(r as f32, g as f32, b as f32) / 255.0
}
