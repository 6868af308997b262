use bevy::prelude::*;

pub const FIELD_ROWS: usize = 20;
pub const FIELD_COLS: usize = 20;
pub const TILE_SIZE: f32 = 0.3;

/// Side length of the centered block of tiles that gets live colliders.
pub const PHYSICS_WINDOW: usize = 5;

/// Fraction of a half turn the field may tilt on each axis.
pub const MAX_TILT: f32 = 0.2;

pub const GRAVITY: f32 = -4.8;

pub const BALL_RADIUS: f32 = 0.2;
pub const BALL_SPAWN: Vec3 = Vec3::new(0.0, 0.2, 0.0);

pub const POINTER_SCALE: f32 = 0.2;
pub const POINTER_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);
