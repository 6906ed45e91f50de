//! Ground reference grid and axis markers.

use bevy::asset::RenderAssetUsages;
use bevy::color::ColorToComponents;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;
use constants::grid::{AXIS_LENGTH, GRID_CENTRE_RGB, GRID_DIVISIONS, GRID_LINE_RGB, GRID_SIZE};

#[derive(Component)]
pub struct GroundGrid;

#[derive(Component)]
pub struct AxisMarkers;

/// One straight grid line on the y = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec3,
    pub end: Vec3,
    pub centre: bool,
}

/// Lines of a square grid centred on the origin, `divisions` cells per edge.
/// Lines through the origin are flagged as centre lines.
pub fn grid_lines(size: f32, divisions: u32) -> Vec<GridLine> {
    let half = size / 2.0;
    let step = size / divisions.max(1) as f32;
    let centre_index = divisions / 2;
    let has_centre = divisions % 2 == 0;

    (0..=divisions)
        .flat_map(|i| {
            let offset = -half + i as f32 * step;
            let centre = has_centre && i == centre_index;
            [
                GridLine {
                    start: Vec3::new(offset, 0.0, -half),
                    end: Vec3::new(offset, 0.0, half),
                    centre,
                },
                GridLine {
                    start: Vec3::new(-half, 0.0, offset),
                    end: Vec3::new(half, 0.0, offset),
                    centre,
                },
            ]
        })
        .collect()
}

fn line_list_mesh(segments: impl IntoIterator<Item = (Vec3, Vec3, Color)>) -> Mesh {
    let mut positions = Vec::new();
    let mut colours = Vec::new();
    for (start, end, colour) in segments {
        let rgba = colour.to_linear().to_f32_array();
        positions.extend([start.to_array(), end.to_array()]);
        colours.extend([rgba, rgba]);
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    mesh
}

fn rgb(bytes: [u8; 3]) -> Color {
    Color::srgb_u8(bytes[0], bytes[1], bytes[2])
}

/// Spawn the grid and the X (red), Y (green), Z (blue) axis lines.
pub fn spawn_reference_grid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    // Vertex colours carry the line colour.
    let line_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    });

    let grid = line_list_mesh(grid_lines(GRID_SIZE, GRID_DIVISIONS).into_iter().map(|line| {
        let colour = if line.centre {
            rgb(GRID_CENTRE_RGB)
        } else {
            rgb(GRID_LINE_RGB)
        };
        (line.start, line.end, colour)
    }));
    commands.spawn((
        Name::new("Reference grid"),
        Mesh3d(meshes.add(grid)),
        MeshMaterial3d(line_material.clone()),
        Transform::IDENTITY,
        NoFrustumCulling,
        GroundGrid,
    ));

    let axes = line_list_mesh([
        (Vec3::ZERO, Vec3::X * AXIS_LENGTH, Color::srgb(1.0, 0.0, 0.0)),
        (Vec3::ZERO, Vec3::Y * AXIS_LENGTH, Color::srgb(0.0, 1.0, 0.0)),
        (Vec3::ZERO, Vec3::Z * AXIS_LENGTH, Color::srgb(0.0, 0.0, 1.0)),
    ]);
    commands.spawn((
        Name::new("Axis markers"),
        Mesh3d(meshes.add(axes)),
        MeshMaterial3d(line_material),
        Transform::IDENTITY,
        AxisMarkers,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_two_lines_per_division_boundary() {
        let lines = grid_lines(20.0, 20);
        assert_eq!(lines.len(), 42);
        assert_eq!(lines.iter().filter(|l| l.centre).count(), 2);

        for line in &lines {
            assert_eq!(line.start.y, 0.0);
            assert!(((line.end - line.start).length() - 20.0).abs() < 1e-4);
        }
    }

    #[test]
    fn centre_lines_pass_through_the_origin() {
        for line in grid_lines(20.0, 20).iter().filter(|l| l.centre) {
            assert!(line.start.x.abs() < 1e-5 || line.start.z.abs() < 1e-5);
        }
    }

    #[test]
    fn odd_division_counts_have_no_centre_line() {
        assert!(grid_lines(10.0, 5).iter().all(|l| !l.centre));
    }
}
