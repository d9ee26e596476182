//! Async loading of GeoTIFF elevation rasters into renderable terrain surfaces.
//!
//! This crate fetches a single-band GeoTIFF over HTTP (or from disk), decodes
//! it, and runs the [`relief_mesh`] construction to produce a [`Surface`].
//!
//! # Design principles
//!
//! - **Futures, not tasks**: Sources return `impl Future` and never spawn;
//!   native HTTP and file reads expect to be polled inside a Tokio runtime
//! - **Sync construction**: Mesh and mask building are synchronous and pure
//! - **Collaborators as traits**: The scene and UI are reached through
//!   [`SceneHost`] and [`LoadingIndicator`]
//!
//! # Example
//!
//! ```ignore
//! use relief::{AnySource, ClassifyParams, run_pipeline};
//!
//! let surface = run_pipeline(
//!     &AnySource::new(),
//!     "https://example.com/elevation.tif",
//!     &ClassifyParams::default(),
//!     &mut scene,
//!     &mut indicator,
//! )
//! .await?;
//! ```

mod error;
pub mod geotiff;
pub mod pipeline;
pub mod source;

pub use error::{Error, Result};
pub use geotiff::decode_geotiff;
pub use pipeline::{LoadingIndicator, PipelineState, SceneHost, TerrainPipeline, run_pipeline};
#[cfg(not(target_family = "wasm"))]
pub use source::FileRasterSource;
pub use source::{AnySource, HttpRasterSource, LocatorKind, RasterSource};

// Re-export construction types for convenience.
pub use relief_mesh::{
    AlphaMask, ClassifyParams, ElevationRaster, MeshGeometry, NonFinitePolicy, Surface,
    SurfaceMaterial,
};
