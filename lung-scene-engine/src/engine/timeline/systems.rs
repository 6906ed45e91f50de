use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use constants::timeline::{
    ANCHOR, CURVE_RGB, LABEL_OPACITY, LABEL_SIZE, MARKER_RADIUS, MARKER_SEGMENTS,
};

use super::layout::{TimelineLayout, layout_predictions};
use super::prediction::PredictionPoint;
use crate::engine::scene::registry::{
    OwnedAsset, SceneAssets, SceneCategory, SceneObject, SceneRegistry,
};

/// Replace the FVC curve. An empty sequence removes it.
#[derive(Event, Debug, Clone, Default)]
pub struct SetPredictions(pub Vec<PredictionPoint>);

/// A new curve has been attached with this many points.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PredictionsReady {
    pub count: usize,
}

#[derive(Component)]
pub struct TimelineCurve;

#[derive(Component)]
pub struct TimelineMarker {
    pub index: usize,
}

/// Placeholder quad above a marker, kept facing the active camera.
#[derive(Component)]
pub struct TimelineLabel {
    pub index: usize,
}

pub fn apply_prediction_updates(
    mut updates: EventReader<SetPredictions>,
    mut registry: ResMut<SceneRegistry>,
    mut scene: SceneAssets,
    mut ready: EventWriter<PredictionsReady>,
) {
    let Some(SetPredictions(predictions)) = updates.read().last() else {
        return;
    };

    if predictions.is_empty() {
        if registry.replace(SceneCategory::Timeline, None, &mut scene) {
            info!("Prediction curve removed");
        }
        return;
    }

    let layout = layout_predictions(predictions);
    let object = spawn_timeline(&mut scene, predictions, &layout);
    registry.replace(SceneCategory::Timeline, Some(object), &mut scene);

    info!("Prediction curve attached with {} points", predictions.len());
    ready.write(PredictionsReady {
        count: predictions.len(),
    });
}

/// Spawn the polyline, markers and labels under one anchored root so the
/// whole set is disposed together.
pub fn spawn_timeline(
    scene: &mut SceneAssets,
    predictions: &[PredictionPoint],
    layout: &TimelineLayout,
) -> SceneObject {
    let [r, g, b] = CURVE_RGB;
    let curve_material = scene.standard_materials.add(StandardMaterial {
        base_color: Color::srgb_u8(r, g, b),
        unlit: true,
        ..default()
    });
    let label_material = scene.standard_materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, LABEL_OPACITY),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: None,
        ..default()
    });

    let mut polyline = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::RENDER_WORLD);
    polyline.insert_attribute(Mesh::ATTRIBUTE_POSITION, layout.points.clone());
    let polyline = scene.meshes.add(polyline);
    let marker = scene.meshes.add(
        Sphere::new(MARKER_RADIUS)
            .mesh()
            .uv(MARKER_SEGMENTS, MARKER_SEGMENTS),
    );
    let label = scene
        .meshes
        .add(Rectangle::new(LABEL_SIZE[0], LABEL_SIZE[1]));

    let root = scene
        .commands
        .spawn((
            Name::new("Prediction timeline"),
            Transform::from_translation(Vec3::from(ANCHOR)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(polyline.clone()),
                MeshMaterial3d(curve_material.clone()),
                Transform::IDENTITY,
                TimelineCurve,
            ));

            for (index, (point, prediction)) in layout.points.iter().zip(predictions).enumerate()
            {
                parent.spawn((
                    Mesh3d(marker.clone()),
                    MeshMaterial3d(curve_material.clone()),
                    Transform::from_translation(*point),
                    TimelineMarker { index },
                ));
                parent.spawn((
                    Name::new(format!(
                        "Week {}: {:.0} mL ({:.0}%)",
                        prediction.week, prediction.fvc_predicted, prediction.confidence
                    )),
                    Mesh3d(label.clone()),
                    MeshMaterial3d(label_material.clone()),
                    Transform::from_translation(layout.labels[index]),
                    TimelineLabel { index },
                ));
            }
        })
        .id();

    SceneObject::new(root)
        .with_asset(OwnedAsset::Mesh(polyline))
        .with_asset(OwnedAsset::Mesh(marker))
        .with_asset(OwnedAsset::Mesh(label))
        .with_asset(OwnedAsset::StandardMaterial(curve_material))
        .with_asset(OwnedAsset::StandardMaterial(label_material))
}

/// Turn label quads toward the camera. The timeline root is never rotated,
/// so local rotation equals world rotation.
pub fn billboard_labels(
    camera: Query<&GlobalTransform, With<Camera3d>>,
    mut labels: Query<(&GlobalTransform, &mut Transform), With<TimelineLabel>>,
) {
    let Ok(camera) = camera.single() else {
        return;
    };
    let eye = camera.translation();

    for (global, mut transform) in &mut labels {
        let to_camera = eye - global.translation();
        if to_camera.length_squared() > f32::EPSILON {
            transform.rotation = Transform::IDENTITY
                .looking_to(-to_camera, Vec3::Y)
                .rotation;
        }
    }
}
