//! Orbit camera: drag to rotate around the terrain, scroll to zoom.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::surface::TerrainSurfaceMarker;

/// Closest the camera may get to its focus.
pub const MIN_DISTANCE: f32 = 1.0;
/// Farthest the camera may get from its focus.
pub const MAX_DISTANCE: f32 = 1500.0;

/// Pitch limit, just short of straight up or down.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Plugin for orbit camera controls.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitSettings>().add_systems(
            Update,
            (frame_new_surface, orbit_input, apply_orbit).chain(),
        );
    }
}

/// Input sensitivity.
#[derive(Resource)]
pub struct OrbitSettings {
    /// Radians per pixel of mouse drag.
    pub rotate_sensitivity: f32,
    /// Zoom factor per scroll line.
    pub zoom_step: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_step: 1.1,
        }
    }
}

/// Camera orbiting `focus` at `distance`, angles around the world Y axis.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitCamera {
    /// Orbit that puts the camera at `focus + offset`.
    #[must_use]
    pub fn from_offset(focus: Vec3, offset: Vec3) -> Self {
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let dir = offset.normalize_or(Vec3::Z);
        Self {
            focus,
            distance,
            yaw: dir.x.atan2(dir.z),
            pitch: dir.y.asin().clamp(-MAX_PITCH, MAX_PITCH),
        }
    }

    /// Camera position implied by the orbit.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus
            + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// Transform looking from [`Self::eye`] at the focus.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }

    /// Rotate by a mouse delta in radians.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Scale the distance, staying inside the allowed range.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// Re-center on a surface once it is published.
fn frame_new_surface(
    surfaces: Query<(&TerrainSurfaceMarker, &GlobalTransform), Added<TerrainSurfaceMarker>>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let Some((marker, transform)) = surfaces.iter().next() else {
        return;
    };
    let center = transform.transform_point(marker.bounds.center);

    for mut orbit in &mut cameras {
        orbit.focus = center;
        orbit.distance = (marker.bounds.radius * 1.5).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    tracing::debug!(%center, radius = marker.bounds.radius, "framed terrain surface");
}

/// Drag with the left button to rotate, scroll to zoom.
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut scroll: MessageReader<MouseWheel>,
    settings: Res<OrbitSettings>,
    mut contexts: EguiContexts,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let over_ui = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());

    let mut drag = Vec2::ZERO;
    for event in motion.read() {
        drag += event.delta;
    }
    if !mouse.pressed(MouseButton::Left) || over_ui {
        drag = Vec2::ZERO;
    }

    let mut lines = 0.0;
    for event in scroll.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        lines += match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
    }
    if over_ui {
        lines = 0.0;
    }

    if drag == Vec2::ZERO && lines == 0.0 {
        return;
    }

    for mut orbit in &mut cameras {
        orbit.rotate(
            -drag.x * settings.rotate_sensitivity,
            drag.y * settings.rotate_sensitivity,
        );
        // Scrolling up moves closer.
        orbit.zoom(settings.zoom_step.powf(-lines));
    }
}

fn apply_orbit(mut cameras: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut cameras {
        *transform = orbit.transform();
    }
}
