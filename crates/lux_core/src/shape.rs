//! Shape records.
//!
//! Every shape is stored in one `Vec<ShapeRecord>`, so records share a fixed
//! stride and are addressed by [`ShapeId`]. Geometry that the kernel would
//! otherwise recompute per ray (plane equation, UV solve, triangle edges) is
//! precomputed here.

use glam::{Mat2, Vec2, Vec3};
use lux_math::Aabb;
use serde::{Deserialize, Serialize};

use crate::{Color, MaterialId, TextureId};

/// Index of a shape in the scene's shape array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u32);

impl ShapeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Infinite plane through three authored points A, B, C.
///
/// UV coordinates are affine in the plane: A maps to (0, 0), B to (1, 0) and
/// C to (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub points: [Vec3; 3],
    pub normal: Vec3,
    /// Signed distance from the origin along `normal`
    pub offset: f32,
    /// The two coordinate axes kept after dropping the normal's dominant axis
    pub uv_axes: [usize; 2],
    /// Point A projected onto `uv_axes`
    pub uv_origin: Vec2,
    /// Inverse of the projected (B - A, C - A) basis
    pub uv_inverse: Mat2,
}

impl Plane {
    /// Build a plane from three points. The normal follows (B - A) x (C - A).
    ///
    /// Collinear points give a singular UV basis; that is not guarded here.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize();
        let n = normal.abs();
        let uv_axes = if n.x >= n.y && n.x >= n.z {
            [1, 2]
        } else if n.y >= n.z {
            [0, 2]
        } else {
            [0, 1]
        };
        let project = |p: Vec3| Vec2::new(p[uv_axes[0]], p[uv_axes[1]]);
        let uv_origin = project(a);
        let basis = Mat2::from_cols(project(b) - uv_origin, project(c) - uv_origin);

        Self {
            points: [a, b, c],
            normal,
            offset: normal.dot(a),
            uv_axes,
            uv_origin,
            uv_inverse: basis.inverse(),
        }
    }

    /// Project a point onto the plane's 2D basis.
    #[inline]
    pub fn project(&self, p: Vec3) -> Vec2 {
        Vec2::new(p[self.uv_axes[0]], p[self.uv_axes[1]])
    }
}

/// Sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Triangle with per-vertex normals and UVs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
    /// v1 - v0
    pub edge1: Vec3,
    /// v2 - v0
    pub edge2: Vec3,
}

impl Triangle {
    /// Create a triangle with authored normals and UVs.
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            vertices,
            normals,
            uvs,
            edge1: vertices[1] - vertices[0],
            edge2: vertices[2] - vertices[0],
        }
    }

    /// Create a triangle whose vertex normals all equal the face normal.
    pub fn flat(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self::new(
            [v0, v1, v2],
            [normal; 3],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
        )
    }

    /// Unnormalized geometric normal (edge1 x edge2).
    #[inline]
    pub fn face_normal(&self) -> Vec3 {
        self.edge1.cross(self.edge2)
    }

    /// Centroid of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }
}

/// Shape geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Shape {
    /// Plane through three points.
    pub fn plane(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Shape::Plane(Plane::new(a, b, c))
    }

    /// Sphere from center and radius. Negative radii are clamped to zero.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Shape::Sphere(Sphere {
            center,
            radius: radius.max(0.0),
        })
    }

    /// Flat-shaded triangle.
    pub fn triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Shape::Triangle(Triangle::flat(v0, v1, v2))
    }

    /// Bounding box of finite shapes. Planes have none.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Shape::Plane(_) => None,
            Shape::Sphere(s) => {
                let r = Vec3::splat(s.radius);
                Some(Aabb::from_points(s.center - r, s.center + r))
            }
            Shape::Triangle(t) => Some(Aabb::enclosing(&t.vertices)),
        }
    }

    /// Only triangles are inserted into the BVH; everything else is tested linearly.
    pub fn is_bvh_candidate(&self) -> bool {
        matches!(self, Shape::Triangle(_))
    }

    /// Returns true for shapes that a ray leaving their surface cannot hit again
    /// from the same side (planes and triangles).
    pub fn is_flat(&self) -> bool {
        !matches!(self, Shape::Sphere(_))
    }
}

/// Perlin-noise bump parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bump {
    pub amount: f32,
    pub scale: f32,
}

impl Bump {
    /// Bump mapping only applies when both parameters are positive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.amount > 0.0 && self.scale > 0.0
    }
}

/// A compiled shape: geometry plus the ids and parameters shading needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRecord {
    pub shape: Shape,
    pub material: MaterialId,
    pub albedo: TextureId,
    pub normal_map: Option<TextureId>,
    pub emission: Color,
    pub bump: Option<Bump>,
}

impl ShapeRecord {
    /// Create a non-emissive record without normal or bump mapping.
    pub fn new(shape: Shape, material: MaterialId, albedo: TextureId) -> Self {
        Self {
            shape,
            material,
            albedo,
            normal_map: None,
            emission: Color::ZERO,
            bump: None,
        }
    }

    /// Set emitted radiance.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// Set a tangent-space normal map texture.
    pub fn with_normal_map(mut self, texture: TextureId) -> Self {
        self.normal_map = Some(texture);
        self
    }

    /// Set Perlin bump parameters.
    pub fn with_bump(mut self, amount: f32, scale: f32) -> Self {
        self.bump = Some(Bump { amount, scale });
        self
    }
}
