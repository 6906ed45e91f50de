use bevy::prelude::*;
use bevy::window::WindowResized;
use constants::camera::{BACKGROUND_RGB, FAR_PLANE, FIELD_OF_VIEW_DEGREES, NEAR_PLANE};
use constants::lighting::{
    AMBIENT_BRIGHTNESS_SCALE, AMBIENT_INTENSITY, DIRECTIONAL_ILLUMINANCE_SCALE,
    FILL_LIGHT_INTENSITY, FILL_LIGHT_POSITION, KEY_LIGHT_INTENSITY, KEY_LIGHT_POSITION,
    POINT_LIGHT_INTENSITY, POINT_LIGHT_POSITION, POINT_LUMENS_SCALE,
};

use super::grid::spawn_reference_grid;
use crate::engine::camera::orbit_camera::{OrbitCamera, OrbitController};

pub fn perspective_projection() -> PerspectiveProjection {
    PerspectiveProjection {
        fov: FIELD_OF_VIEW_DEGREES.to_radians(),
        near: NEAR_PLANE,
        far: FAR_PLANE,
        ..default()
    }
}

/// Startup system: camera, light rig, reference grid and clear colour.
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    controller: Res<OrbitController>,
) {
    let [r, g, b] = BACKGROUND_RGB;
    commands.insert_resource(ClearColor(Color::srgb_u8(r, g, b)));

    spawn_camera(&mut commands, &controller);
    spawn_lighting(&mut commands);
    spawn_reference_grid(&mut commands, &mut meshes, &mut materials);

    info!("Scene initialised");
}

fn spawn_camera(commands: &mut Commands, controller: &OrbitController) {
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Projection::Perspective(perspective_projection()),
        controller.transform(),
        OrbitCamera,
    ));
}

fn spawn_lighting(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_INTENSITY * AMBIENT_BRIGHTNESS_SCALE,
        ..default()
    });

    for (name, intensity, position) in [
        ("Key light", KEY_LIGHT_INTENSITY, KEY_LIGHT_POSITION),
        ("Fill light", FILL_LIGHT_INTENSITY, FILL_LIGHT_POSITION),
    ] {
        commands.spawn((
            Name::new(name),
            DirectionalLight {
                illuminance: intensity * DIRECTIONAL_ILLUMINANCE_SCALE,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(Vec3::from(position)).looking_at(Vec3::ZERO, Vec3::Y),
        ));
    }

    commands.spawn((
        Name::new("Point light"),
        PointLight {
            intensity: POINT_LIGHT_INTENSITY * POINT_LUMENS_SCALE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::from(POINT_LIGHT_POSITION)),
    ));
}

/// Keep the camera aspect ratio in step with the window.
pub fn sync_viewport_on_resize(
    mut resized: EventReader<WindowResized>,
    mut cameras: Query<&mut Projection, With<OrbitCamera>>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    if event.width <= 0.0 || event.height <= 0.0 {
        return;
    }

    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = event.width / event.height;
        }
    }
    debug!("Viewport resized to {}x{}", event.width, event.height);
}
