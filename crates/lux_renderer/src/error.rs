//! Renderer errors.
//!
//! The kernel itself never fails; these cover configuration and the
//! buffers handed in by the application.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("Buffer holds {actual} elements, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Pixel {pixel} is outside the {count}-pixel frame")]
    PixelOutOfRange { pixel: usize, count: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;
