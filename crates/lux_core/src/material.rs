//! Material records.
//!
//! A material only selects the scattering model and its scalar parameters;
//! surface color comes from the shape's albedo texture.

/// Index of a material in the scene's material array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Scattering model of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Material {
    /// Ideal diffuse reflector.
    #[default]
    Lambertian,
    /// Glossy metal; larger exponents concentrate the lobe around the mirror direction.
    Phong { exponent: f32 },
    /// Perfect specular reflector.
    Mirror,
    /// Dielectric with refraction.
    Glass { ior: f32 },
    /// Dielectric coating over a diffuse base.
    ClearCoat { ior: f32 },
}

impl Material {
    /// Create a glass material (1.5 = window glass, 2.4 = diamond).
    pub fn glass(ior: f32) -> Self {
        Material::Glass { ior }
    }

    /// Create a Phong metal. Negative exponents are clamped to zero (uniform lobe).
    pub fn phong(exponent: f32) -> Self {
        Material::Phong {
            exponent: exponent.max(0.0),
        }
    }

    /// Create a clear-coated diffuse material.
    pub fn clear_coat(ior: f32) -> Self {
        Material::ClearCoat { ior }
    }
}
