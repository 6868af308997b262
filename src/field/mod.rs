pub mod grid;

use std::f32::consts::PI;

use bevy::{
    prelude::*,
    render::{mesh::VertexAttributeValues, render_resource::PrimitiveTopology},
    window::PrimaryWindow,
};
use tracing::trace_span;

use crate::constants::*;
use grid::{Edge, TileGrid};

pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TileSlot>()
            .init_resource::<ScrollCommandQueue>()
            .init_resource::<DirtyTiles>()
            .add_startup_system(spawn_field)
            .add_systems(
                Update,
                (
                    read_scroll_keys,
                    apply_scroll_commands.run_if(|q: Res<ScrollCommandQueue>| !q.is_empty()),
                    apply_tile_transforms.run_if(|d: Res<DirtyTiles>| !d.is_empty()),
                    level_control,
                )
                    .chain(),
            );
    }
}

/// Root entity the tiles hang off; tilting it tilts the whole field.
#[derive(Component)]
pub struct FieldRoot;

/// Grid slot rendered by this entity.
#[derive(Component, Reflect, Debug)]
pub struct TileSlot(pub usize);

/// Tile entities in slot order, parallel to the grid's tile array.
#[derive(Resource, Deref)]
pub struct TileEntities(Vec<Entity>);

/// Slots whose grid translation changed and still needs copying into the
/// entity transform.
#[derive(Resource, Deref, DerefMut, Default)]
pub struct DirtyTiles(Vec<usize>);

#[derive(Clone, Copy, Debug)]
pub enum ScrollCommand {
    Row { which: i64, edge: Edge },
    Col { which: i64, edge: Edge },
}

#[derive(Resource, Default)]
pub struct ScrollCommandQueue {
    commands: Vec<ScrollCommand>,
}

impl ScrollCommandQueue {
    pub fn push(&mut self, command: ScrollCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn drain(&mut self) -> impl Iterator<Item = ScrollCommand> + '_ {
        self.commands.drain(..)
    }
}

fn spawn_field(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut dirty: ResMut<DirtyTiles>,
) {
    let mut grid = TileGrid::new(FIELD_ROWS, FIELD_COLS, TILE_SIZE, PHYSICS_WINDOW)
        .unwrap_or_else(|e| panic!("box field construction failed: {e}"));

    // One geometry and one material instance shared by the whole field.
    let mesh = meshes.add(tile_mesh(TILE_SIZE));
    let material = materials.add(StandardMaterial::default());

    let root = commands
        .spawn((Name::new("BoxField"), FieldRoot, SpatialBundle::default()))
        .id();

    let mut tiles = Vec::with_capacity(grid.len());
    for slot in 0..grid.len() {
        let tile = grid.tile(slot);
        let entity = commands
            .spawn((
                Name::new("Tile"),
                TileSlot(slot),
                PbrBundle {
                    mesh: mesh.clone(),
                    material: material.clone(),
                    transform: Transform {
                        translation: tile.translation,
                        rotation: tile.rotation,
                        ..default()
                    },
                    ..default()
                },
            ))
            .id();
        tiles.push(entity);
    }
    commands.entity(root).push_children(&tiles);

    // Opening scroll: carries the last column and row to the leading edge so
    // the window starts one step into the conveyor.
    dirty.extend(grid.move_apparent_col(-1, Edge::Beginning));
    dirty.extend(grid.move_apparent_row(-1, Edge::Beginning));

    info!(
        "spawned {} tiles ({}x{}), {} colliders",
        grid.len(),
        grid.rows(),
        grid.cols(),
        grid.physics_window().len()
    );

    commands.insert_resource(TileEntities(tiles));
    commands.insert_resource(grid);
}

fn read_scroll_keys(keys: Res<Input<KeyCode>>, mut queue: ResMut<ScrollCommandQueue>) {
    for (key, command) in [
        (
            KeyCode::Up,
            ScrollCommand::Row {
                which: -1,
                edge: Edge::Beginning,
            },
        ),
        (
            KeyCode::Down,
            ScrollCommand::Row {
                which: 0,
                edge: Edge::End,
            },
        ),
        (
            KeyCode::Left,
            ScrollCommand::Col {
                which: -1,
                edge: Edge::Beginning,
            },
        ),
        (
            KeyCode::Right,
            ScrollCommand::Col {
                which: 0,
                edge: Edge::End,
            },
        ),
    ] {
        if keys.just_pressed(key) {
            queue.push(command);
        }
    }
}

fn apply_scroll_commands(
    mut queue: ResMut<ScrollCommandQueue>,
    mut grid: ResMut<TileGrid>,
    mut dirty: ResMut<DirtyTiles>,
) {
    for command in queue.drain() {
        let moved = match command {
            ScrollCommand::Row { which, edge } => grid.move_apparent_row(which, edge),
            ScrollCommand::Col { which, edge } => grid.move_apparent_col(which, edge),
        };
        dirty.extend(moved);
    }
}

fn apply_tile_transforms(
    mut dirty: ResMut<DirtyTiles>,
    grid: Res<TileGrid>,
    entities: Res<TileEntities>,
    mut transforms: Query<&mut Transform, With<TileSlot>>,
) {
    let _span = trace_span!("apply_tile_transforms").entered();
    for slot in dirty.drain(..) {
        let mut transform = transforms
            .get_mut(entities[slot])
            .expect("dirty slot without a tile entity");
        transform.translation = grid.tile(slot).translation;
    }
}

fn level_control(
    mut cursor_moved: EventReader<CursorMoved>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut root: Query<&mut Transform, With<FieldRoot>>,
) {
    let Some(moved) = cursor_moved.iter().last() else {
        return;
    };
    let Ok(window) = window.get_single() else {
        return;
    };
    let Ok(mut transform) = root.get_single_mut() else {
        return;
    };

    let (rx, rz) = tilt_angles(
        moved.position,
        Vec2::new(window.width(), window.height()),
        MAX_TILT,
    );
    transform.rotation = Quat::from_euler(EulerRot::XYZ, rx, 0.0, rz);
}

/// Maps a cursor position linearly across the window to tilt angles in
/// [-max_tilt * PI, +max_tilt * PI] around the x and z axes.
fn tilt_angles(cursor: Vec2, window: Vec2, max_tilt: f32) -> (f32, f32) {
    let nx = (cursor.x / window.x) * 2.0 - 1.0;
    let ny = (cursor.y / window.y) * 2.0 - 1.0;
    (PI * max_tilt * ny, PI * max_tilt * nx)
}

/// Box showing only its top, front and right faces; the other three are
/// never visible under the fixed tilt. Flat-shaded, non-indexed.
fn tile_mesh(size: f32) -> Mesh {
    let c = -(size / 2.0);
    let s = size / 2.0;

    let positions = vec![
        [c, s, c], [c, s, s], [s, s, s], [c, s, c], [s, s, s], [s, s, c],
        [c, c, s], [s, c, s], [s, s, s], [c, c, s], [s, s, s], [c, s, s],
        [s, c, c], [s, s, c], [s, s, s], [s, c, c], [s, s, s], [s, c, s],
    ];

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
    fn tilt_is_zero_at_the_window_center() {
        let (rx, rz) = tilt_angles(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0), 0.2);
        assert!(rx.abs() < 1e-6);
        assert!(rz.abs() < 1e-6);
    }

    #[test]
    fn tilt_saturates_at_the_window_corners() {
        let max = 0.2 * PI;
        let (rx, rz) = tilt_angles(Vec2::new(800.0, 600.0), Vec2::new(800.0, 600.0), 0.2);
        assert!((rx - max).abs() < 1e-6);
        assert!((rz - max).abs() < 1e-6);

        let (rx, rz) = tilt_angles(Vec2::ZERO, Vec2::new(800.0, 600.0), 0.2);
        assert!((rx + max).abs() < 1e-6);
        assert!((rz + max).abs() < 1e-6);
    }

    #[test]
    fn tilt_is_linear_in_between() {
        let (rx, rz) = tilt_angles(Vec2::new(600.0, 300.0), Vec2::new(800.0, 600.0), 0.2);
        assert!(rx.abs() < 1e-6);
        assert!((rz - 0.1 * PI).abs() < 1e-6);
    }

    #[test]
    fn scroll_queue_drains_in_order() {
        let mut queue = ScrollCommandQueue::default();
        assert!(queue.is_empty());
        queue.push(ScrollCommand::Row {
            which: 0,
            edge: Edge::End,
        });
        queue.push(ScrollCommand::Col {
            which: -1,
            edge: Edge::Beginning,
        });
        assert!(!queue.is_empty());

        let drained: Vec<ScrollCommand> = queue.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], ScrollCommand::Row { which: 0, .. }));
        assert!(matches!(
            drained[1],
            ScrollCommand::Col {
                which: -1,
                edge: Edge::Beginning
            }
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn tile_mesh_has_three_faces() {
        let mesh = tile_mesh(0.3);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("tile mesh has no positions");
        };
        assert_eq!(positions.len(), 18);
        // Every vertex sits on the box surface.
        for p in positions {
            assert!(p.iter().all(|v| v.abs() <= 0.15 + 1e-6));
            assert!(p.iter().any(|v| (v.abs() - 0.15).abs() < 1e-6));
        }
    }
}
