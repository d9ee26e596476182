//! The one-shot load pipeline and its collaborators.
//!
//! [`run_pipeline`] fetches a raster, builds the surface, hands it to a
//! [`SceneHost`] and then tells a [`LoadingIndicator`] that construction is
//! done. On failure nothing is published and the indicator is not signalled;
//! the error goes back to the caller.
//!
//! [`TerrainPipeline`] tracks the lifecycle for callers that want to reload.
//! Each [`TerrainPipeline::begin`] opens a new generation; results from an
//! older generation are dropped, which is how a superseded load is cancelled.

use std::sync::Arc;

use relief_mesh::{ClassifyParams, Surface, build_surface};

use crate::error::Result;
use crate::source::RasterSource;

/// Receives the finished surface.
pub trait SceneHost {
    /// Take shared, read-only ownership of a published surface.
    fn add_surface(&mut self, surface: Arc<Surface>);
}

/// The UI's progress overlay.
pub trait LoadingIndicator {
    /// Fired once, after the surface has been published.
    fn signal_load_complete(&mut self);
}

/// Load `locator`, build its surface and publish it.
pub async fn run_pipeline<S, H, L>(
    source: &S,
    locator: &str,
    params: &ClassifyParams,
    scene: &mut H,
    indicator: &mut L,
) -> Result<Arc<Surface>>
where
    S: RasterSource,
    H: SceneHost + ?Sized,
    L: LoadingIndicator + ?Sized,
{
    let raster = source.load(locator).await?;
    tracing::info!(
        locator,
        width = raster.width(),
        height = raster.height(),
        "raster loaded"
    );

    let surface = Arc::new(build_surface(&raster, params)?);
    tracing::info!(
        vertices = surface.geometry().vertex_count(),
        triangles = surface.geometry().triangle_count(),
        opaque_texels = surface.mask().opaque_count(),
        "terrain surface built"
    );

    scene.add_surface(Arc::clone(&surface));
    indicator.signal_load_complete();

    Ok(surface)
}

/// Lifecycle of a terrain load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Loading {
        generation: u64,
    },
    Ready {
        generation: u64,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

/// State machine around repeated loads.
#[derive(Debug, Default)]
pub struct TerrainPipeline {
    state: PipelineState,
    next_generation: u64,
}

impl TerrainPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, PipelineState::Loading { .. })
    }

    /// Whether `generation` is the load currently in flight.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.state == (PipelineState::Loading { generation })
    }

    /// Enter `Loading` and return the generation the caller must report back.
    ///
    /// Allowed from every state. Starting while a load is in flight
    /// supersedes it: its eventual result will be ignored.
    pub fn begin(&mut self) -> u64 {
        if let PipelineState::Loading { generation } = self.state {
            tracing::debug!(generation, "superseding in-flight terrain load");
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.state = PipelineState::Loading { generation };
        generation
    }

    /// Record the outcome of load `generation`.
    ///
    /// Returns `false` and leaves the state untouched if that load is no longer
    /// the current one.
    pub fn finish<T>(&mut self, generation: u64, result: &Result<T>) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding stale terrain load result");
            return false;
        }

        self.state = match result {
            Ok(_) => PipelineState::Ready { generation },
            Err(e) => PipelineState::Failed {
                generation,
                message: e.to_string(),
            },
        };
        true
    }
}
