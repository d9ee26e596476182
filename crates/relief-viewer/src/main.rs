//! 3D viewer for GeoTIFF terrain using Bevy.
//!
//! Loads an elevation raster, builds its relief surface in the background and
//! shows it with orbit controls.

mod camera;
mod launch_params;
mod loader;
mod scene;
mod surface;
mod ui;

use bevy::prelude::*;
use camera::OrbitCameraPlugin;
use loader::TerrainLoaderPlugin;
use scene::ScenePlugin;
use ui::LoadingUiPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ScenePlugin,
            OrbitCameraPlugin,
            LoadingUiPlugin,
            TerrainLoaderPlugin,
        ));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    tracing::info!(raster = %params.raster, ?params.classify, "launching viewer");

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "relief-viewer".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }))
    .insert_resource(params)
    .add_plugins(AppPlugin)
    .run();
}
