//! Error types for terrain construction.

use std::fmt;

/// Errors that can occur while turning a raster into a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The declared raster dimensions do not match the sample buffer.
    MalformedRaster {
        width: u32,
        height: u32,
        sample_count: usize,
    },
    /// The raster has a zero-sized dimension.
    EmptyRaster { width: u32, height: u32 },
    /// A sample could not be turned into a finite displacement.
    NonFiniteSample { index: usize, value: f32 },
    /// Classification parameters are unusable.
    InvalidParams { detail: String },
    /// Two buffers that must describe the same grid disagree.
    DimensionMismatch {
        context: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRaster {
                width,
                height,
                sample_count,
            } => {
                let expected = u64::from(*width) * u64::from(*height);
                write!(
                    f,
                    "malformed raster: {width}x{height} needs {expected} samples, got {sample_count}"
                )
            }
            Self::EmptyRaster { width, height } => {
                write!(f, "raster has no cells: {width}x{height}")
            }
            Self::NonFiniteSample { index, value } => {
                write!(f, "sample {index} has non-finite displacement ({value})")
            }
            Self::InvalidParams { detail } => {
                write!(f, "invalid classification parameters: {detail}")
            }
            Self::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "{context} dimensions {}x{} do not match {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Result type for terrain construction.
pub type MeshResult<T> = Result<T, MeshError>;
