//! Intersection engine.
//!
//! Finds the nearest shape along a ray: stackless traversal of the flat BVH
//! (triangles) followed by a linear pass over the residual planes and spheres.

use lux_core::{BvhNode, Plane, Scene, Shape, ShapeId, Sphere, Triangle};
use lux_math::{Interval, Ray, Vec2};

/// Hits at or closer than this distance are rejected to avoid self-intersection acne.
pub const EPSILON: f32 = 1e-4;

/// Denominators below this are treated as a ray parallel to the surface.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Nearest hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit
    pub t: f32,
    pub shape: ShapeId,
    /// Barycentric (u, v) for triangles; zero for other shapes
    pub barycentric: Vec2,
}

/// Ray/plane intersection.
#[inline]
pub fn hit_plane(plane: &Plane, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let denom = plane.normal.dot(ray.direction());
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane.offset - plane.normal.dot(ray.origin())) / denom;
    ray_t.surrounds(t).then_some(t)
}

/// Ray/sphere intersection: the nearer root if it lies in range, else the farther one.
#[inline]
pub fn hit_sphere(sphere: &Sphere, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let oc = sphere.center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    let near = (h - sqrtd) / a;
    if ray_t.surrounds(near) {
        return Some(near);
    }
    let far = (h + sqrtd) / a;
    ray_t.surrounds(far).then_some(far)
}

/// Möller-Trumbore ray/triangle intersection.
///
/// Returns the ray parameter and the barycentric weights of vertices 1 and 2.
#[inline]
pub fn hit_triangle(tri: &Triangle, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec2)> {
    let h = ray.direction().cross(tri.edge2);
    let det = tri.edge1.dot(h);

    // Ray is parallel to triangle
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin() - tri.vertices[0];
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(tri.edge1);
    let v = f * ray.direction().dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * tri.edge2.dot(q);
    ray_t.surrounds(t).then_some((t, Vec2::new(u, v)))
}

/// Dispatch to the type-specific intersection routine.
#[inline]
pub fn hit_shape(shape: &Shape, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec2)> {
    match shape {
        Shape::Plane(plane) => hit_plane(plane, ray, ray_t).map(|t| (t, Vec2::ZERO)),
        Shape::Sphere(sphere) => hit_sphere(sphere, ray, ray_t).map(|t| (t, Vec2::ZERO)),
        Shape::Triangle(tri) => hit_triangle(tri, ray, ray_t),
    }
}

/// Running minimum over candidate shapes.
struct Closest<'a> {
    scene: &'a Scene,
    ray: &'a Ray,
    skip: Option<ShapeId>,
    ray_t: Interval,
    hit: Option<Hit>,
}

impl<'a> Closest<'a> {
    fn new(scene: &'a Scene, ray: &'a Ray, skip: Option<ShapeId>) -> Self {
        Self {
            scene,
            ray,
            skip,
            ray_t: Interval::new(EPSILON, f32::INFINITY),
            hit: None,
        }
    }

    /// Test one shape; a hit replaces the current one only if strictly nearer.
    #[inline]
    fn consider(&mut self, id: ShapeId) {
        if self.skip == Some(id) {
            return;
        }
        let shape = &self.scene.shape(id).shape;
        if let Some((t, barycentric)) = hit_shape(shape, self.ray, self.ray_t) {
            self.ray_t = self.ray_t.with_max(t);
            self.hit = Some(Hit {
                t,
                shape: id,
                barycentric,
            });
        }
    }
}

/// Find the nearest hit, ignoring `skip`.
///
/// Walks the BVH from node 0: a missed box jumps along its miss link, a hit
/// tree node descends to its child, and a hit leaf tests its shapes and then
/// follows its miss link. Boxes beyond the closest hit so far count as
/// missed. Residual planes and spheres are tested afterwards.
pub fn intersect(scene: &Scene, ray: &Ray, skip: Option<ShapeId>) -> Option<Hit> {
    let mut closest = Closest::new(scene, ray, skip);
    let bvh = scene.bvh();

    let mut next = (!bvh.is_empty()).then_some(0u32);
    while let Some(index) = next {
        let node = &bvh.nodes[index as usize];
        if !node.bbox().hit(ray, closest.ray_t) {
            next = node.miss();
            continue;
        }

        next = match *node {
            BvhNode::Tree { child, .. } => Some(child),
            BvhNode::Leaf {
                miss, first, count, ..
            } => {
                for &id in bvh.leaf(first, count) {
                    closest.consider(id);
                }
                miss
            }
        };
    }

    for &id in scene.unbounded() {
        closest.consider(id);
    }

    closest.hit
}

/// Brute-force nearest hit over every shape, ignoring the BVH.
pub fn intersect_linear(scene: &Scene, ray: &Ray, skip: Option<ShapeId>) -> Option<Hit> {
    let mut closest = Closest::new(scene, ray, skip);
    for i in 0..scene.shape_count() {
        closest.consider(ShapeId(i as u32));
    }
    closest.hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{Color, Material, SceneBuilder, ShapeRecord, Texture};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const FULL: Interval = Interval::new(EPSILON, f32::INFINITY);

    fn random_vec(rng: &mut StdRng, scale: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
        )
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = hit_sphere(&sphere, &ray, FULL).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside_returns_far_root() {
        let sphere = Sphere {
            center: Vec3::ZERO,
            radius: 2.0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = hit_sphere(&sphere, &ray, FULL).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_behind_or_missed() {
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        assert!(hit_sphere(&sphere, &Ray::new(Vec3::ZERO, Vec3::Z), FULL).is_none());
        assert!(hit_sphere(&sphere, &Ray::new(Vec3::ZERO, Vec3::Y), FULL).is_none());
    }

    #[test]
    fn test_plane_hit_and_parallel() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Z, Vec3::X);
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 1.0));
        let t = hit_plane(&plane, &ray, FULL).unwrap();
        assert!((t - 3.0).abs() < 1e-5);

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(hit_plane(&plane, &parallel, FULL).is_none());
    }

    #[test]
    fn test_hits_at_origin_are_rejected() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Z, Vec3::X);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(hit_plane(&plane, &ray, FULL).is_none());
    }

    #[test]
    fn test_triangle_barycentric() {
        let tri = Triangle::flat(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        );
        let ray = Ray::new(Vec3::new(0.0, -0.5, 0.0), -Vec3::Z);
        let (t, bary) = hit_triangle(&tri, &ray, FULL).unwrap();

        assert!((t - 1.0).abs() < 1e-5);
        assert!((bary - Vec2::new(0.5, 0.25)).length() < 1e-5);

        let outside = Ray::new(Vec3::new(0.9, 0.9, 0.0), -Vec3::Z);
        assert!(hit_triangle(&tri, &outside, FULL).is_none());
    }

    #[test]
    fn test_skip_ignores_shape() {
        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::solid(Color::ONE));
        let diffuse = builder.add_material(Material::Lambertian);
        let near = builder.add_shape(ShapeRecord::new(
            Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0),
            diffuse,
            white,
        ));
        let far = builder.add_shape(ShapeRecord::new(
            Shape::sphere(Vec3::new(0.0, 0.0, 10.0), 1.0),
            diffuse,
            white,
        ));
        let scene = builder.build().unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(intersect(&scene, &ray, None).unwrap().shape, near);
        assert_eq!(intersect(&scene, &ray, Some(near)).unwrap().shape, far);
        assert!(intersect(&scene, &Ray::new(Vec3::ZERO, -Vec3::Z), None).is_none());
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::solid(Color::ONE));
        let diffuse = builder.add_material(Material::Lambertian);

        for _ in 0..200 {
            let center = random_vec(&mut rng, 10.0);
            builder.add_shape(ShapeRecord::new(
                Shape::triangle(
                    center + random_vec(&mut rng, 1.0),
                    center + random_vec(&mut rng, 1.0),
                    center + random_vec(&mut rng, 1.0),
                ),
                diffuse,
                white,
            ));
        }
        builder.add_shape(ShapeRecord::new(
            Shape::sphere(Vec3::new(2.0, 1.0, -3.0), 1.5),
            diffuse,
            white,
        ));
        builder.add_shape(ShapeRecord::new(
            Shape::plane(
                Vec3::new(0.0, -12.0, 0.0),
                Vec3::new(0.0, -12.0, 1.0),
                Vec3::new(1.0, -12.0, 0.0),
            ),
            diffuse,
            white,
        ));
        let scene = builder.build().unwrap();

        let mut hits = 0;
        for _ in 0..500 {
            let origin = random_vec(&mut rng, 15.0);
            let target = random_vec(&mut rng, 8.0);
            let ray = Ray::new(origin, (target - origin).normalize());
            let skip = rng.gen_bool(0.2).then(|| ShapeId(rng.gen_range(0..200)));

            let fast = intersect(&scene, &ray, skip);
            let slow = intersect_linear(&scene, &ray, skip);
            match (fast, slow) {
                (Some(a), Some(b)) => {
                    hits += 1;
                    assert_eq!(a.shape, b.shape);
                    assert!((a.t - b.t).abs() < 1e-4);
                }
                (None, None) => {}
                other => panic!("BVH and linear scan disagree: {other:?}"),
            }
        }
        assert!(hits > 100, "too few rays hit anything ({hits})");
    }
}
