mod constants;
mod debug;
mod field;
mod physics;
mod pointer;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use smooth_bevy_cameras::{
    controllers::orbit::{OrbitCameraBundle, OrbitCameraController, OrbitCameraPlugin},
    LookTransformPlugin,
};

use crate::{debug::DebugPlugin, field::FieldPlugin, physics::PhysicsPlugin, pointer::PointerPlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugin(EguiPlugin)
        .add_plugin(WorldInspectorPlugin::new())
        .add_plugin(LookTransformPlugin)
        .add_plugin(OrbitCameraPlugin::default())
        .add_plugin(FieldPlugin)
        .add_plugin(PhysicsPlugin)
        .add_plugin(PointerPlugin)
        .add_plugin(DebugPlugin)
        .add_startup_system(setup)
        .run();
}

fn setup(mut commands: Commands) {
    info!("Starting up!");

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.5,
    });

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 10_000.0,
            ..default()
        },
        transform: Transform::from_xyz(5.0, 3.0, 1.0),
        ..default()
    });

    commands
        .spawn(Camera3dBundle::default())
        .insert(OrbitCameraBundle::new(
            OrbitCameraController::default(),
            Vec3::new(0.0, 10.0, 6.0),
            Vec3::ZERO,
            Vec3::Y,
        ));
}
