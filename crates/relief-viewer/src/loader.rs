//! Async terrain loading.
//!
//! Runs [`relief::run_pipeline`] on a background task. The scene host and
//! loading indicator it is handed forward their calls over an
//! `async_channel`; the main thread drains the channel each frame, spawns the
//! surface and updates the overlay. Every message carries the generation of
//! the load that produced it so results from a superseded load are dropped.
//!
//! Natively the load runs on Tokio through `bevy_tokio_tasks`, since reqwest
//! and the file source need its reactor. On WASM it runs on the browser's
//! event loop through Bevy's `AsyncComputeTaskPool`.

use std::future::Future;
use std::sync::Arc;

use bevy::prelude::*;
use relief::{AnySource, LoadingIndicator, SceneHost, Surface, TerrainPipeline};

use crate::launch_params::LaunchParams;
use crate::surface::{TerrainSurfaceMarker, spawn_surface};
use crate::ui::LoadingOverlay;

/// Plugin for loading the terrain surface.
pub struct TerrainLoaderPlugin;

impl Plugin for TerrainLoaderPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_family = "wasm"))]
        app.add_plugins(bevy_tokio_tasks::TokioTasksPlugin::default());
        #[cfg(target_family = "wasm")]
        app.init_resource::<LoadRuntime>();

        app.init_resource::<LoaderState>()
            .init_resource::<LoaderChannels>()
            .add_systems(Startup, start_initial_load)
            .add_systems(Update, (reload_on_key, poll_terrain_load).chain());
    }
}

/// Executor for terrain loads.
#[cfg(not(target_family = "wasm"))]
type LoadRuntime = bevy_tokio_tasks::TokioTasksRuntime;

/// Executor for terrain loads; the browser drives the futures.
#[cfg(target_family = "wasm")]
#[derive(Resource, Default)]
struct LoadRuntime;

/// Run one terrain load job to completion in the background.
#[cfg(not(target_family = "wasm"))]
fn spawn_load_job<F>(runtime: &LoadRuntime, job: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime.spawn_background_task(move |_ctx| job);
}

/// Run one terrain load job to completion in the background.
#[cfg(target_family = "wasm")]
fn spawn_load_job<F>(_runtime: &LoadRuntime, job: F)
where
    F: Future<Output = ()> + 'static,
{
    bevy::tasks::AsyncComputeTaskPool::get()
        .spawn_local(job)
        .detach();
}

/// State for the terrain loader.
#[derive(Resource)]
pub struct LoaderState {
    /// Raster fetcher shared with background tasks.
    pub source: Arc<AnySource>,
    /// Lifecycle of the current load.
    pub pipeline: TerrainPipeline,
}

impl Default for LoaderState {
    fn default() -> Self {
        Self {
            source: Arc::new(AnySource::new()),
            pipeline: TerrainPipeline::new(),
        }
    }
}

/// What a background load reports back.
#[derive(Debug)]
enum LoaderMessage {
    Surface {
        generation: u64,
        surface: Arc<Surface>,
    },
    Complete {
        generation: u64,
    },
    Finished {
        generation: u64,
        result: relief::Result<()>,
    },
}

/// Channel between background loads and the main thread.
#[derive(Resource)]
pub struct LoaderChannels {
    rx: async_channel::Receiver<LoaderMessage>,
    tx: async_channel::Sender<LoaderMessage>,
}

impl Default for LoaderChannels {
    fn default() -> Self {
        // Unbounded: the collaborator callbacks are synchronous and must not drop.
        let (tx, rx) = async_channel::unbounded();
        Self { rx, tx }
    }
}

/// [`SceneHost`] that forwards the surface to the main thread.
struct ChannelSceneHost {
    generation: u64,
    tx: async_channel::Sender<LoaderMessage>,
}

impl SceneHost for ChannelSceneHost {
    fn add_surface(&mut self, surface: Arc<Surface>) {
        let _ = self.tx.try_send(LoaderMessage::Surface {
            generation: self.generation,
            surface,
        });
    }
}

/// [`LoadingIndicator`] that forwards the completion signal.
struct ChannelIndicator {
    generation: u64,
    tx: async_channel::Sender<LoaderMessage>,
}

impl LoadingIndicator for ChannelIndicator {
    fn signal_load_complete(&mut self) {
        let _ = self.tx.try_send(LoaderMessage::Complete {
            generation: self.generation,
        });
    }
}

/// Open a new generation and run the pipeline for it in the background.
fn start_load(
    state: &mut LoaderState,
    channels: &LoaderChannels,
    params: &LaunchParams,
    runtime: &LoadRuntime,
) {
    let generation = state.pipeline.begin();
    let source = Arc::clone(&state.source);
    let locator = params.raster.clone();
    let classify = params.classify;
    let tx = channels.tx.clone();

    spawn_load_job(runtime, async move {
        let mut scene = ChannelSceneHost {
            generation,
            tx: tx.clone(),
        };
        let mut indicator = ChannelIndicator {
            generation,
            tx: tx.clone(),
        };
        let result =
            relief::run_pipeline(&*source, &locator, &classify, &mut scene, &mut indicator).await;
        let _ = tx
            .send(LoaderMessage::Finished {
                generation,
                result: result.map(|_| ()),
            })
            .await;
    });

    tracing::info!(generation, locator = %params.raster, "started terrain load");
}

#[allow(clippy::needless_pass_by_value)]
fn start_initial_load(
    mut state: ResMut<LoaderState>,
    channels: Res<LoaderChannels>,
    params: Res<LaunchParams>,
    runtime: Res<LoadRuntime>,
) {
    start_load(&mut state, &channels, &params, &runtime);
}

/// Press R to drop the current surface and load the raster again.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn reload_on_key(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<LoaderState>,
    channels: Res<LoaderChannels>,
    params: Res<LaunchParams>,
    runtime: Res<LoadRuntime>,
    mut overlay: ResMut<LoadingOverlay>,
    surfaces: Query<Entity, With<TerrainSurfaceMarker>>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    for entity in &surfaces {
        commands.entity(entity).despawn();
    }
    overlay.restart();
    start_load(&mut state, &channels, &params, &runtime);
}

/// Apply messages from background loads.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn poll_terrain_load(
    mut commands: Commands,
    mut state: ResMut<LoaderState>,
    channels: Res<LoaderChannels>,
    mut overlay: ResMut<LoadingOverlay>,
    time: Res<Time>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    while let Ok(message) = channels.rx.try_recv() {
        match message {
            LoaderMessage::Surface {
                generation,
                surface,
            } => {
                if !state.pipeline.is_current(generation) {
                    tracing::debug!(generation, "dropping surface from superseded load");
                    continue;
                }
                let entity = spawn_surface(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    &mut images,
                    &surface,
                );
                tracing::info!(generation, ?entity, "terrain surface added to scene");
            }
            LoaderMessage::Complete { generation } => {
                if state.pipeline.is_current(generation) {
                    overlay.signal_load_complete(time.elapsed_secs());
                }
            }
            LoaderMessage::Finished { generation, result } => {
                if !state.pipeline.finish(generation, &result) {
                    continue;
                }
                if let Err(e) = result {
                    tracing::error!(generation, "terrain load failed: {e}");
                    overlay.fail(e.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_mesh::{ClassifyParams, ElevationRaster, build_surface};

    #[test]
    fn test_channel_collaborators_tag_messages_with_generation() {
        let channels = LoaderChannels::default();
        let raster = ElevationRaster::new(2, 1, vec![0.0, 50.0]).unwrap();
        let surface = Arc::new(build_surface(&raster, &ClassifyParams::default()).unwrap());

        let mut scene = ChannelSceneHost {
            generation: 7,
            tx: channels.tx.clone(),
        };
        let mut indicator = ChannelIndicator {
            generation: 7,
            tx: channels.tx.clone(),
        };
        scene.add_surface(Arc::clone(&surface));
        indicator.signal_load_complete();

        match channels.rx.try_recv() {
            Ok(LoaderMessage::Surface {
                generation,
                surface: published,
            }) => {
                assert_eq!(generation, 7);
                assert!(Arc::ptr_eq(&published, &surface));
            }
            other => panic!("expected a surface, got {other:?}"),
        }
        assert!(matches!(
            channels.rx.try_recv(),
            Ok(LoaderMessage::Complete { generation: 7 })
        ));
        assert!(channels.rx.try_recv().is_err());
    }

    #[test]
    fn test_superseded_generation_is_not_current() {
        let mut state = LoaderState::default();
        let first = state.pipeline.begin();
        let second = state.pipeline.begin();
        assert!(!state.pipeline.is_current(first));
        assert!(state.pipeline.is_current(second));
    }
}
