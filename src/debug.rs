use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use bevy_rapier3d::prelude::Velocity;
use rand::Rng;

use crate::{
    constants::*,
    field::{
        grid::{Edge, TileGrid},
        ScrollCommand, ScrollCommandQueue,
    },
    physics::Ball,
};

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_system(ui_debug);
    }
}

fn ui_debug(
    mut contexts: EguiContexts,
    grid: Res<TileGrid>,
    mut queue: ResMut<ScrollCommandQueue>,
    mut light: Query<&mut Transform, With<DirectionalLight>>,
    mut ball: Query<(&mut Transform, &mut Velocity), (With<Ball>, Without<DirectionalLight>)>,
) {
    egui::Window::new("Box Field").show(contexts.ctx_mut(), |ui| {
        for (k, v) in [
            ("Origin row", grid.origin_row()),
            ("Origin col", grid.origin_col()),
            ("Tiles", grid.len()),
            ("Colliders", grid.physics_window().len()),
        ] {
            ui.label(format!("{k}: {v}"));
        }

        ui.separator();

        ui.label("Scroll:");
        ui.horizontal(|ui| {
            if ui.button("Row to beginning").clicked() {
                queue.push(ScrollCommand::Row {
                    which: -1,
                    edge: Edge::Beginning,
                });
            }
            if ui.button("Row to end").clicked() {
                queue.push(ScrollCommand::Row {
                    which: 0,
                    edge: Edge::End,
                });
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Col to beginning").clicked() {
                queue.push(ScrollCommand::Col {
                    which: -1,
                    edge: Edge::Beginning,
                });
            }
            if ui.button("Col to end").clicked() {
                queue.push(ScrollCommand::Col {
                    which: 0,
                    edge: Edge::End,
                });
            }
        });

        ui.separator();

        if let Ok(mut transform) = light.get_single_mut() {
            ui.add(egui::Slider::new(&mut transform.translation.x, -20.0..=20.0).text("Light x"));
        }

        if ui.button("Reset ball").clicked() {
            if let Ok((mut transform, mut velocity)) = ball.get_single_mut() {
                let mut rng = rand::thread_rng();
                transform.translation = BALL_SPAWN
                    + Vec3::new(
                        rng.gen_range(-0.05..=0.05),
                        0.0,
                        rng.gen_range(-0.05..=0.05),
                    );
                *velocity = Velocity::zero();
            }
        }
    });
}
