//! Camera record.
//!
//! Read-only during a render pass. The application mutates it between passes
//! and must reset accumulation when it does.

use glam::Vec3;

use crate::error::{SceneError, SceneResult};

/// Pinhole or thin-lens camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    // Image settings
    pub width: u32,
    pub height: u32,

    // Orthonormal basis
    pub eye: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,

    // Lens settings
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Aperture radius; 0 is a pinhole
    pub aperture: f32,
    /// Distance from the eye to the plane of perfect focus
    pub focus_distance: f32,
}

impl Camera {
    /// Create a camera at the origin looking down -Z.
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 450,
            eye: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            forward: -Vec3::Z,
            vfov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set camera position and orientation.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.eye = look_from;
        self.forward = (look_at - look_from).normalize();
        self.right = self.forward.cross(vup).normalize();
        self.up = self.right.cross(self.forward);
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_distance: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_distance = focus_distance;
        self
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Check resolution and basis.
    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidCamera(format!(
                "resolution {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.right.is_finite() && self.up.is_finite() && self.forward.is_finite()) {
            return Err(SceneError::InvalidCamera(
                "basis is degenerate (look direction parallel to up?)".to_string(),
            ));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "vertical field of view {} is outside (0, 180)",
                self.vfov
            )));
        }
        Ok(())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
