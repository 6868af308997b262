use bevy::{prelude::*, transform::TransformSystem};
use bevy_rapier3d::prelude::*;
use tracing::trace_span;

use crate::{
    constants::*,
    field::{grid::TileGrid, TileEntities, TileSlot},
};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(RapierConfiguration {
            gravity: Vec3::new(0.0, GRAVITY, 0.0),
            ..RapierConfiguration::default()
        })
        .add_plugin(RapierPhysicsPlugin::<NoUserData>::default())
        // PostStartup so the field's spawn commands have been applied.
        .add_systems(PostStartup, spawn_colliders)
        // Collider poses must be copied after this frame's world transforms
        // are final and before the physics backend consumes them.
        .add_systems(
            PostUpdate,
            sync_collider_transforms
                .after(TransformSystem::TransformPropagate)
                .before(PhysicsSet::SyncBackend),
        );
    }
}

/// Kinematic stand-in keeping one tile's collider posed in world space.
#[derive(Component)]
pub struct TileCollider;

#[derive(Component)]
pub struct Ball;

/// Collider entities paired index-for-index with the grid's physics window.
#[derive(Resource, Deref)]
pub struct PhysicsProxies(Vec<Entity>);

pub fn spawn_colliders(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    grid: Res<TileGrid>,
) {
    let half = grid.tile_size() / 2.0;
    let mut proxies = Vec::with_capacity(grid.physics_window().len());
    for &slot in grid.physics_window() {
        let tile = grid.tile(slot);
        let entity = commands
            .spawn((
                Name::new("TileCollider"),
                TileCollider,
                RigidBody::KinematicPositionBased,
                Collider::cuboid(half, half, half),
                TransformBundle::from_transform(Transform {
                    translation: tile.translation,
                    rotation: tile.rotation,
                    ..default()
                }),
            ))
            .id();
        proxies.push(entity);
    }
    commands.insert_resource(PhysicsProxies(proxies));

    commands.spawn((
        Name::new("Ball"),
        Ball,
        PbrBundle {
            mesh: meshes.add(
                shape::UVSphere {
                    radius: BALL_RADIUS,
                    sectors: 32,
                    stacks: 32,
                }
                .into(),
            ),
            material: materials.add(StandardMaterial::from(Color::rgb(1.0, 0.0, 0.0))),
            transform: Transform::from_translation(BALL_SPAWN),
            ..default()
        },
        RigidBody::Dynamic,
        Collider::ball(BALL_RADIUS),
        ColliderMassProperties::Density(1.0),
        Friction::coefficient(0.2),
        Restitution::coefficient(0.2),
        Velocity::zero(),
        // The field can tilt away under a resting ball at any time.
        Sleeping::disabled(),
    ));
}

/// Copies each physics-window tile's composed world transform onto its
/// collider, once per tick.
fn sync_collider_transforms(
    grid: Res<TileGrid>,
    proxies: Res<PhysicsProxies>,
    entities: Res<TileEntities>,
    tiles: Query<&GlobalTransform, With<TileSlot>>,
    mut colliders: Query<&mut Transform, With<TileCollider>>,
) {
    let _span = trace_span!("sync_collider_transforms").entered();

    let window = grid.physics_window();
    assert_eq!(
        proxies.len(),
        window.len(),
        "collider list out of step with the physics window"
    );

    for (&slot, &proxy) in window.iter().zip(proxies.iter()) {
        let world = tiles
            .get(entities[slot])
            .expect("physics window tile without a transform");
        let (_, rotation, translation) = world.to_scale_rotation_translation();

        let mut transform = colliders
            .get_mut(proxy)
            .expect("physics proxy entity disappeared");
        transform.translation = translation;
        transform.rotation = rotation;
    }
}
