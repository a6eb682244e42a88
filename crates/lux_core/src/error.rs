//! Errors raised while compiling or validating a scene.
//!
//! The kernel assumes a validated scene; everything that could make it index
//! out of bounds or loop forever is rejected here.

use thiserror::Error;

/// Errors that can occur during scene compilation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("BVH node {node} has link {link} that does not point forward (node count {len})")]
    MalformedBvh { node: usize, link: u32, len: usize },

    #[error("BVH leaf {node} references shapes {first}..{end} but only {len} leaf entries exist")]
    LeafRangeOutOfBounds {
        node: usize,
        first: u32,
        end: u64,
        len: usize,
    },

    #[error("Shape {shape} is out of range ({count} shapes)")]
    ShapeOutOfRange { shape: u32, count: usize },

    #[error("Shape {shape} references material {material} ({count} materials)")]
    MaterialOutOfRange {
        shape: u32,
        material: u32,
        count: usize,
    },

    #[error("Shape {shape} references texture {texture} ({count} textures)")]
    TextureOutOfRange {
        shape: u32,
        texture: u32,
        count: usize,
    },

    #[error("Image texture {texture} is {width}x{height} but holds {pixels} pixels")]
    TextureSizeMismatch {
        texture: u32,
        width: u32,
        height: u32,
        pixels: usize,
    },

    #[error("Image texture {0} has no pixels")]
    EmptyImage(u32),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid sky: {0}")]
    InvalidSky(String),

    #[error("Mesh triangle {triangle} reads {attribute} {index} but only {len} exist")]
    MeshIndexOutOfRange {
        triangle: usize,
        attribute: &'static str,
        index: u32,
        len: usize,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;
