//! LUX Core - the flat scene store consumed by the path tracing kernel.
//!
//! This crate provides:
//!
//! - **Scene records**: `ShapeRecord`, `Material`, `Texture`, `Camera`, `SkyParams`
//! - **Flat BVH**: a depth-first node array with "miss" links for stackless traversal
//! - **Scene compiler**: `SceneBuilder`, which builds the BVH and validates every
//!   buffer once so the kernel never has to
//!
//! # Example
//!
//! ```ignore
//! use lux_core::{Camera, Material, SceneBuilder, Shape, ShapeRecord, Texture};
//!
//! let mut builder = SceneBuilder::new();
//! let white = builder.add_texture(Texture::solid(Vec3::ONE));
//! let diffuse = builder.add_material(Material::Lambertian);
//! builder.add_shape(ShapeRecord::new(Shape::sphere(Vec3::Z * 5.0, 1.0), diffuse, white));
//! let scene = builder.build()?;
//! ```

pub mod bvh;
pub mod camera;
pub mod error;
pub mod material;
pub mod scene;
pub mod shape;
pub mod sky;
pub mod texture;

// Re-export commonly used types
pub use bvh::{Bvh, BvhNode, LEAF_MAX_SIZE};
pub use camera::Camera;
pub use error::{SceneError, SceneResult};
pub use material::{Material, MaterialId};
pub use scene::{Scene, SceneBuilder};
pub use shape::{Bump, Plane, Shape, ShapeId, ShapeRecord, Sphere, Triangle};
pub use sky::{SkyParams, SkySettings};
pub use texture::{Checkerboard, ImageTexture, Texture, TextureId};

/// Color type alias (linear RGB, typically 0-1 for albedo, unbounded for radiance)
pub type Color = lux_math::Vec3;
