//! Loading overlay.
//!
//! Shows a spinner while the terrain is built, fades out over
//! [`FADE_SECONDS`] once the load completes and reports the error if it fails.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

/// Duration of the fade after the load completes.
pub const FADE_SECONDS: f32 = 1.5;

/// Plugin for the loading overlay.
pub struct LoadingUiPlugin;

impl Plugin for LoadingUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<LoadingOverlay>()
            .add_systems(EguiPrimaryContextPass, loading_overlay_system);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum OverlayPhase {
    #[default]
    Loading,
    Fading {
        since: f32,
    },
    Hidden,
    Failed {
        message: String,
    },
}

/// Visibility of the loading overlay.
#[derive(Resource, Debug, Default)]
pub struct LoadingOverlay {
    phase: OverlayPhase,
}

impl LoadingOverlay {
    /// Start fading out. Only the first signal of a load counts.
    pub fn signal_load_complete(&mut self, now: f32) {
        if self.phase == OverlayPhase::Loading {
            self.phase = OverlayPhase::Fading { since: now };
        }
    }

    /// Replace the spinner with `message`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = OverlayPhase::Failed {
            message: message.into(),
        };
    }

    /// Show the spinner again for a new load.
    pub fn restart(&mut self) {
        self.phase = OverlayPhase::Loading;
    }

    /// Whether the overlay is still waiting on a load.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == OverlayPhase::Loading
    }

    /// Opacity at time `now`; zero once hidden.
    #[must_use]
    pub fn opacity(&self, now: f32) -> f32 {
        match self.phase {
            OverlayPhase::Loading | OverlayPhase::Failed { .. } => 1.0,
            OverlayPhase::Fading { since } => fade_alpha(now - since),
            OverlayPhase::Hidden => 0.0,
        }
    }

    fn advance(&mut self, now: f32) {
        if let OverlayPhase::Fading { since } = self.phase
            && now - since >= FADE_SECONDS
        {
            self.phase = OverlayPhase::Hidden;
        }
    }
}

/// Linear fade from 1 to 0 over [`FADE_SECONDS`].
#[must_use]
pub fn fade_alpha(elapsed: f32) -> f32 {
    (1.0 - elapsed / FADE_SECONDS).clamp(0.0, 1.0)
}

#[allow(clippy::needless_pass_by_value)]
fn loading_overlay_system(
    mut contexts: EguiContexts,
    mut overlay: ResMut<LoadingOverlay>,
    time: Res<Time>,
) -> Result {
    let now = time.elapsed_secs();
    overlay.advance(now);
    if overlay.phase == OverlayPhase::Hidden {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    let opacity = overlay.opacity(now);

    egui::Area::new(egui::Id::new("loading_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.set_opacity(opacity);
            egui::Frame::popup(ui.style()).show(ui, |ui| match &overlay.phase {
                OverlayPhase::Failed { message } => {
                    ui.colored_label(egui::Color32::RED, "Failed to load terrain");
                    ui.label(message);
                    ui.label("Press R to retry.");
                }
                _ => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading terrain...");
                    });
                }
            });
        });

    Ok(())
}
