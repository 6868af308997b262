use std::f32::consts::PI;

use bevy::{
    prelude::*,
    render::{mesh::VertexAttributeValues, render_resource::PrimitiveTopology},
};

use crate::{
    constants::*,
    field::{grid::TileGrid, FieldRoot, TileEntities, TileSlot},
};

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        // PostStartup so the field's spawn commands have been applied.
        app.add_systems(PostStartup, spawn_pointers)
            .add_system(update_pointers);
    }
}

/// Marker cone hovering above one tile, following it in world space.
#[derive(Component)]
pub struct MeshPointer {
    target: Entity,
    offset: Vec3,
}

fn spawn_pointers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    grid: Res<TileGrid>,
    entities: Res<TileEntities>,
) {
    let mesh = meshes.add(pointer_mesh(POINTER_SCALE));
    let material = materials.add(StandardMaterial::from(Color::rgb(1.0, 0.0, 0.0)));

    // Pointer targets are captured once; they keep following these tiles no
    // matter how far the window scrolls afterwards.
    for &slot in &grid.apparent_col(0) {
        let tile = grid.tile(slot);
        commands.spawn((
            Name::new("MeshPointer"),
            MeshPointer {
                target: entities[slot],
                offset: POINTER_OFFSET,
            },
            PbrBundle {
                mesh: mesh.clone(),
                material: material.clone(),
                transform: Transform::from_translation(tile.translation + POINTER_OFFSET)
                    .with_rotation(Quat::from_rotation_z(PI)),
                ..default()
            },
        ));
    }
}

fn update_pointers(
    root: Query<&Transform, (With<FieldRoot>, Without<MeshPointer>)>,
    tiles: Query<&Transform, (With<TileSlot>, Without<MeshPointer>, Without<FieldRoot>)>,
    mut pointers: Query<(&MeshPointer, &mut Transform), (Without<FieldRoot>, Without<TileSlot>)>,
) {
    let Ok(root) = root.get_single() else {
        return;
    };

    // The root is a top-level entity, so composing by hand yields this
    // frame's world position without waiting on transform propagation.
    for (pointer, mut transform) in &mut pointers {
        let Ok(tile) = tiles.get(pointer.target) else {
            continue;
        };
        transform.translation = root.mul_transform(*tile).translation + pointer.offset;
    }
}

/// Four-sided cone pointing up: apex on +y, square base, flat-shaded.
fn pointer_mesh(scale: f32) -> Mesh {
    let r = 0.5 * scale;
    let h = scale;
    let apex = [0.0, h / 2.0, 0.0];
    let ring: [[f32; 3]; 4] = [
        [r, -h / 2.0, 0.0],
        [0.0, -h / 2.0, r],
        [-r, -h / 2.0, 0.0],
        [0.0, -h / 2.0, -r],
    ];

    let mut positions = Vec::with_capacity(18);
    for i in 0..4 {
        let a = ring[i];
        let b = ring[(i + 1) % 4];
        positions.extend([apex, b, a]);
    }
    positions.extend([ring[0], ring[1], ring[2], ring[0], ring[2], ring[3]]);

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        VertexAttributeValues::Float32x3(positions),
    );
    mesh.compute_flat_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_mesh_is_a_closed_pyramid() {
        let mesh = pointer_mesh(0.2);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("pointer mesh has no positions");
        };
        // Four sides plus a two-triangle base.
        assert_eq!(positions.len(), 18);

        let apex_count = positions.iter().filter(|p| p[1] > 0.0).count();
        assert_eq!(apex_count, 4);
        for p in positions {
            assert!(p[1].abs() <= 0.1 + 1e-6);
        }
    }
}
