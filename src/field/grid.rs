use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::f32::consts::PI;
use thiserror::Error;
use tracing::instrument;

/// Tilt shared by every tile: a quarter-turn roll around z, then a backwards
/// lean around x, composed in world-axis order.
static TILE_TILT: Lazy<Quat> =
    Lazy::new(|| Quat::from_rotation_x(-PI * 0.20) * Quat::from_rotation_z(PI * 0.25));

pub fn diag(side_1: f32, side_2: f32) -> f32 {
    (side_1 * side_1 + side_2 * side_2).sqrt()
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field needs positive dimensions, got {rows}x{cols}")]
    EmptyField { rows: usize, cols: usize },
    #[error("tile size must be positive, got {0}")]
    BadTileSize(f32),
    #[error("physics window must be positive")]
    EmptyWindow,
    #[error("physics window of {window} does not fit a {rows}x{cols} field")]
    WindowTooLarge {
        window: usize,
        rows: usize,
        cols: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    Beginning,
    End,
}

#[derive(Clone, Copy, Debug)]
pub struct Tile {
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Fixed-size row-major tile grid that behaves like an endlessly scrollable
/// surface. `origin_row`/`origin_col` mark the physical slot currently acting
/// as apparent (0, 0); the recyclers shift them as boundary rows and columns
/// are carried to the opposite edge. Slots never migrate, only their
/// translations move, so a slot index is a stable tile identity.
#[derive(Resource)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    tile_size: f32,
    origin_row: usize,
    origin_col: usize,
    tiles: Vec<Tile>,
    physics_window: Vec<usize>,
}

impl TileGrid {
    /// Lays the tiles out in a diagonally-offset brick pattern: rows stack
    /// along z at 85% of the tile diagonal, each row shifted a quarter
    /// diagonal in x by parity.
    pub fn new(
        rows: usize,
        cols: usize,
        tile_size: f32,
        window: usize,
    ) -> Result<Self, FieldError> {
        if rows == 0 || cols == 0 {
            return Err(FieldError::EmptyField { rows, cols });
        }
        if !(tile_size > 0.0) {
            return Err(FieldError::BadTileSize(tile_size));
        }
        if window == 0 {
            return Err(FieldError::EmptyWindow);
        }
        if window > rows.min(cols) {
            return Err(FieldError::WindowTooLarge { window, rows, cols });
        }

        let spacing = diag(tile_size, tile_size);
        let mut tiles = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let zi = row as i64 - (rows / 2) as i64;
            let shift = if zi % 2 == 0 { 0.25 } else { -0.25 };
            for col in 0..cols {
                let xi = col as i64 - (cols / 2) as i64;
                tiles.push(Tile {
                    translation: Vec3::new(
                        xi as f32 * spacing + shift * spacing,
                        0.0,
                        zi as f32 * spacing * 0.85,
                    ),
                    rotation: *TILE_TILT,
                });
            }
        }

        let min_row = rows / 2 - window / 2;
        let min_col = cols / 2 - window / 2;
        let mut physics_window = Vec::with_capacity(window * window);
        for row in min_row..min_row + window {
            for col in min_col..min_col + window {
                physics_window.push(row * cols + col);
            }
        }

        Ok(Self {
            rows,
            cols,
            tile_size,
            origin_row: 0,
            origin_col: 0,
            tiles,
            physics_window,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn origin_row(&self) -> usize {
        self.origin_row
    }

    pub fn origin_col(&self) -> usize {
        self.origin_col
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, slot: usize) -> &Tile {
        &self.tiles[slot]
    }

    /// Slots of the centered sub-grid that carries live colliders, in
    /// row-major window order. Captured once at construction; scrolling
    /// never changes the set.
    pub fn physics_window(&self) -> &[usize] {
        &self.physics_window
    }

    /// Total wrap: non-negative for any integer input.
    pub fn safe_row_index(&self, n: i64) -> usize {
        n.rem_euclid(self.rows as i64) as usize
    }

    pub fn safe_col_index(&self, n: i64) -> usize {
        n.rem_euclid(self.cols as i64) as usize
    }

    /// Physical row accessor; ignores the origin. Negative indices count
    /// from the end.
    pub fn row(&self, r: i64) -> Vec<usize> {
        let row = self.safe_row_index(r);
        (0..self.cols).map(|c| row * self.cols + c).collect()
    }

    pub fn col(&self, c: i64) -> Vec<usize> {
        let col = self.safe_col_index(c);
        (0..self.rows).map(|r| r * self.cols + col).collect()
    }

    /// Row `r` of the apparent window, left to right in apparent column
    /// order. Apparent indices are relative to the scroll origin and wrap
    /// toroidally.
    pub fn apparent_row(&self, r: i64) -> Vec<usize> {
        let row = self.safe_row_index(self.origin_row as i64 + r);
        (0..self.cols)
            .map(|x| row * self.cols + self.safe_col_index(self.origin_col as i64 + x as i64))
            .collect()
    }

    pub fn apparent_col(&self, c: i64) -> Vec<usize> {
        let col = self.safe_col_index(self.origin_col as i64 + c);
        (0..self.rows)
            .map(|y| self.safe_row_index(self.origin_row as i64 + y as i64) * self.cols + col)
            .collect()
    }

    /// Carries the tile row at apparent index `which` to the opposite edge
    /// of the window and shifts the origin so the remaining rows stay a
    /// contiguous apparent window. Returns the slots whose translations
    /// changed so callers can resync their transforms.
    #[instrument(skip_all, level = "trace")]
    pub fn move_apparent_row(&mut self, which: i64, edge: Edge) -> Vec<usize> {
        let target = match edge {
            Edge::Beginning => self.row(self.origin_row as i64),
            Edge::End => self.row(self.origin_row as i64 - 1),
        };
        let moving = self.apparent_row(which);

        let spacing = diag(self.tile_size, self.tile_size);
        let scale = 1.0 + spacing / (spacing * self.rows as f32);
        for (&t, &m) in target.iter().zip(&moving) {
            let movement = (self.tiles[t].translation - self.tiles[m].translation) * scale;
            self.tiles[m].translation += movement;
        }

        self.origin_row = match edge {
            Edge::Beginning => self.safe_row_index(self.origin_row as i64 - 1),
            Edge::End => self.safe_row_index(self.origin_row as i64 + 1),
        };
        moving
    }

    #[instrument(skip_all, level = "trace")]
    pub fn move_apparent_col(&mut self, which: i64, edge: Edge) -> Vec<usize> {
        let target = match edge {
            Edge::Beginning => self.col(self.origin_col as i64),
            Edge::End => self.col(self.origin_col as i64 - 1),
        };
        let moving = self.apparent_col(which);

        let spacing = diag(self.tile_size, self.tile_size);
        let scale = 1.0 + spacing / (spacing * self.cols as f32);
        for (&t, &m) in target.iter().zip(&moving) {
            let movement = (self.tiles[t].translation - self.tiles[m].translation) * scale;
            self.tiles[m].translation += movement;
        }

        self.origin_col = match edge {
            Edge::Beginning => self.safe_col_index(self.origin_col as i64 - 1),
            Edge::End => self.safe_col_index(self.origin_col as i64 + 1),
        };
        moving
    }
}
