//! Surface evaluation: hit point, normal and UV for a confirmed hit, followed
//! by optional normal-map and Perlin bump perturbation.

use std::f32::consts::PI;

use lux_core::{Bump, Plane, Scene, Shape, ShapeRecord, Sphere, Texture, Triangle};
use lux_math::{Onb, Ray, Vec2, Vec3};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::Hit;

/// How triangle normals are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shading {
    /// One face normal per triangle
    Flat,
    /// Barycentric interpolation of vertex normals
    #[default]
    Interpolated,
}

/// Geometry at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Unit shading normal on the shape's outward side (not flipped towards the ray)
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Evaluate the surface at `hit` and apply the shape's perturbations.
pub fn evaluate_surface(
    scene: &Scene,
    ray: &Ray,
    hit: &Hit,
    shading: Shading,
    noise: &Perlin,
) -> SurfaceHit {
    let record = scene.shape(hit.shape);
    let point = ray.at(hit.t);

    let (normal, uv) = match &record.shape {
        Shape::Plane(plane) => (plane.normal, plane_uv(plane, point)),
        Shape::Sphere(sphere) => sphere_surface(sphere, point),
        Shape::Triangle(tri) => triangle_surface(tri, hit.barycentric, shading),
    };

    let mut surface = SurfaceHit { point, normal, uv };
    apply_normal_map(scene, record, &mut surface);
    if let Some(bump) = record.bump.filter(Bump::is_active) {
        surface.normal = bump_normal(surface.normal, point, &bump, noise);
    }
    surface
}

/// Affine UV from the plane's precomputed inverse basis.
///
/// A collinear A/B/C basis yields non-finite UVs; texture lookups tolerate them.
#[inline]
fn plane_uv(plane: &Plane, point: Vec3) -> Vec2 {
    plane.uv_inverse * (plane.project(point) - plane.uv_origin)
}

/// Spherical mapping: u from the azimuth in XZ, v from the latitude.
#[inline]
fn sphere_surface(sphere: &Sphere, point: Vec3) -> (Vec3, Vec2) {
    let normal = (point - sphere.center).normalize_or_zero();
    let u = 0.5 + normal.z.atan2(normal.x) / (2.0 * PI);
    let v = 0.5 + normal.y.clamp(-1.0, 1.0).asin() / PI;
    (normal, Vec2::new(u, v))
}

/// Barycentric interpolation of vertex UVs and (optionally) normals.
fn triangle_surface(tri: &Triangle, barycentric: Vec2, shading: Shading) -> (Vec3, Vec2) {
    let (u, v) = (barycentric.x, barycentric.y);
    let w = 1.0 - u - v;
    let uv = w * tri.uvs[0] + u * tri.uvs[1] + v * tri.uvs[2];

    let face = tri.face_normal().normalize_or_zero();
    let mut normal = match shading {
        Shading::Flat => face,
        Shading::Interpolated => {
            let n = (w * tri.normals[0] + u * tri.normals[1] + v * tri.normals[2])
                .normalize_or_zero();
            if n == Vec3::ZERO {
                face
            } else {
                n
            }
        }
    };

    // Keep the sign consistent with the authored normals
    let authored = tri.normals[0];
    if authored.length_squared() > 0.0 && normal.dot(authored) < 0.0 {
        normal = -normal;
    }

    (normal, uv)
}

/// Replace the normal with a tangent-space normal from an image texture.
fn apply_normal_map(scene: &Scene, record: &ShapeRecord, surface: &mut SurfaceHit) {
    let Some(texture) = record.normal_map else {
        return;
    };
    let Texture::Image(image) = scene.texture(texture) else {
        return;
    };

    let tangent = image.sample(surface.uv) * 2.0 - Vec3::ONE;
    let mapped = Onb::from_w(surface.normal)
        .to_world(tangent)
        .normalize_or_zero();
    if mapped != Vec3::ZERO {
        surface.normal = mapped;
    }
}

/// Offset the normal by Perlin noise sampled on three permutations of the
/// scaled hit point.
fn bump_normal(normal: Vec3, point: Vec3, bump: &Bump, noise: &Perlin) -> Vec3 {
    let p = (point * bump.scale).as_dvec3();
    let offset = Vec3::new(
        noise.get([p.x, p.y, p.z]) as f32,
        noise.get([p.y, p.z, p.x]) as f32,
        noise.get([p.z, p.x, p.y]) as f32,
    );

    let bumped = (normal + bump.amount * offset).normalize_or_zero();
    if bumped == Vec3::ZERO {
        normal
    } else {
        bumped
    }
}
