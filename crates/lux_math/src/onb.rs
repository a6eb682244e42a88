use crate::Vec3;

/// Orthonormal basis built around a single axis `w`.
///
/// Used for hemisphere sampling, tangent-space normal maps and the sky frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis is the normalized input.
    pub fn from_w(w: Vec3) -> Self {
        let w = w.normalize();
        let (u, v) = w.any_orthonormal_pair();
        Self { u, v, w }
    }

    /// Map local coordinates (u, v, w) to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }

    /// Express a world-space vector in this basis.
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        Vec3::new(world.dot(self.u), world.dot(self.v), world.dot(self.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onb_is_orthonormal() {
        for w in [Vec3::Y, -Vec3::Z, Vec3::new(1.0, 2.0, -3.0)] {
            let onb = Onb::from_w(w);
            assert!((onb.u.length() - 1.0).abs() < 1e-5);
            assert!((onb.v.length() - 1.0).abs() < 1e-5);
            assert!(onb.u.dot(onb.v).abs() < 1e-5);
            assert!(onb.u.dot(onb.w).abs() < 1e-5);
            assert!(onb.v.dot(onb.w).abs() < 1e-5);
        }
    }

    #[test]
    fn test_onb_round_trip() {
        let onb = Onb::from_w(Vec3::new(0.2, 0.9, 0.1));
        let d = Vec3::new(0.3, -0.5, 0.8);
        let back = onb.to_world(onb.to_local(d));
        assert!((back - d).length() < 1e-5);
        assert!((onb.to_world(Vec3::Z) - onb.w).length() < 1e-6);
    }
}
