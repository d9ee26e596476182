//! Build displaced terrain meshes and transparency masks from elevation rasters.
//!
//! This crate turns a decoded elevation raster into a renderable surface: a
//! grid mesh pushed out by the scaled elevation, and an RGB opacity mask that
//! hides cells with no visible relief. Everything here is pure and
//! synchronous; fetching and decoding the raster is left to the caller.
//!
//! # Index conventions
//!
//! - Raster and mesh: row-major, row 0 at the top, cell `(i, j)` at `i + j * width`.
//! - Mask: row-major, row 0 at the bottom, cell `(i, j)` at texel
//!   `(i, height - 1 - j)`.
//!
//! Both builders read the same [`Classification`], so a cell is flat in the
//! mesh exactly when it is transparent in the mask.

pub mod classify;
mod error;
pub mod mask;
pub mod mesh;
mod raster;
pub mod surface;

pub use classify::{
    ClassifiedCell, Classification, ClassifyParams, NonFinitePolicy, classify,
};
pub use error::{MeshError, MeshResult};
pub use mask::{AlphaMask, build_alpha_mask, texture_row_from_mesh_row};
pub use mesh::{BoundingSphere, MeshGeometry, build_mesh};
pub use raster::{ElevationRaster, cell_index};
pub use surface::{Surface, SurfaceMaterial, build_surface};
