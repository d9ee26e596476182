//! Camera and lights.

use bevy::prelude::*;

use crate::camera::OrbitCamera;

/// Where the camera starts relative to the origin.
const CAMERA_OFFSET: Vec3 = Vec3::new(100.0, -400.0, -500.0);

/// Control points of the path swept by the red light, in the terrain plane.
const LIGHT_PATH: [Vec2; 4] = [
    Vec2::new(90.0, -370.0),
    Vec2::new(110.0, -200.0),
    Vec2::new(30.0, 90.0),
    Vec2::new(-80.0, 350.0),
];

/// Depth of the red light, on the relief side of the surface.
const LIGHT_DEPTH: f32 = -20.0;

/// Milliseconds per radian of the light's back-and-forth sweep.
const LIGHT_PERIOD_MS: f32 = 4096.0;

/// Plugin for the static scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, move_path_light);
    }
}

/// Marker for the light that follows [`LIGHT_PATH`].
#[derive(Component)]
pub struct PathLight;

fn setup_scene(mut commands: Commands) {
    let orbit = OrbitCamera::from_offset(Vec3::ZERO, CAMERA_OFFSET);

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: bevy::camera::ClearColorConfig::Custom(Color::srgb(0.05, 0.05, 0.08)),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 10_000.0,
            ..Default::default()
        }),
        orbit.transform(),
        orbit,
    ));

    commands.spawn((
        DirectionalLight {
            color: Color::WHITE,
            illuminance: 10_000.0,
            ..default()
        },
        Transform::from_xyz(-5000.0, 1000.0, -1000.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let start = path_point(&LIGHT_PATH, 0.5);
    commands.spawn((
        PathLight,
        PointLight {
            color: Color::srgb(1.0, 0.0, 0.0),
            intensity: 100_000_000.0,
            range: 2000.0,
            ..default()
        },
        Transform::from_xyz(start.x, start.y, LIGHT_DEPTH),
    ));

    tracing::info!("Scene setup complete - drag to orbit, scroll to zoom, R to reload");
}

#[allow(clippy::needless_pass_by_value)]
fn move_path_light(time: Res<Time>, mut lights: Query<&mut Transform, With<PathLight>>) {
    let t = sweep(time.elapsed_secs() * 1000.0);
    let p = path_point(&LIGHT_PATH, t);
    for mut transform in &mut lights {
        transform.translation = Vec3::new(p.x, p.y, LIGHT_DEPTH);
    }
}

/// Position along the path in `[0, 1]` at `millis`, oscillating sinusoidally.
#[must_use]
pub fn sweep(millis: f32) -> f32 {
    (f32::sin(millis / LIGHT_PERIOD_MS) + 1.0) / 2.0
}

/// Uniform Catmull-Rom spline through `points`, sampled at `t` in `[0, 1]`.
///
/// End segments reuse the end point as their outer control point, so the
/// curve starts at the first point and finishes at the last.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn path_point(points: &[Vec2], t: f32) -> Vec2 {
    match points {
        [] => Vec2::ZERO,
        [only] => *only,
        _ => {
            let last = points.len() - 1;
            let scaled = last as f32 * t.clamp(0.0, 1.0);
            let segment = (scaled.floor() as usize).min(last - 1);
            let weight = scaled - segment as f32;

            let p0 = points[segment.saturating_sub(1)];
            let p1 = points[segment];
            let p2 = points[segment + 1];
            let p3 = points[(segment + 2).min(last)];
            catmull_rom(p0, p1, p2, p3, weight)
        }
    }
}

fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * p1 - 2.0 * p2 + v0 + v1) * t3 + (-3.0 * p1 + 3.0 * p2 - 2.0 * v0 - v1) * t2 + v0 * t + p1
}
