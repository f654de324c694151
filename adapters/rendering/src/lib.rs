#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilewalk adapters.
//!
//! Renderers only ever read a [`Scene`]; they never feed back into
//! pathfinding or occupancy decisions.

mod input;
mod text;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use tilewalk_core::{CellCoord, Direction, EntityId, RenderGroup};

pub use input::control_from_key;
pub use text::TextBackend;

/// Grid dimensions a scene is laid out on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a tile in rendered units.
    pub tile_size: f32,
}

impl TileGridPresentation {
    /// Creates a grid presentation, rejecting non-positive tile sizes.
    pub fn new(columns: u32, rows: u32, tile_size: f32) -> Result<Self, RenderingError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }
        Ok(Self {
            columns,
            rows,
            tile_size,
        })
    }

    /// Width of the grid in rendered units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the grid in rendered units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }
}

/// Everything a renderer needs to draw one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// Entity the item depicts.
    pub entity: EntityId,
    /// Sprite identifier.
    pub sprite: String,
    /// Authoritative cell, for renderers that draw on the grid.
    pub cell: CellCoord,
    /// Continuous position in rendered units.
    pub position: Vec2,
    /// Bounding box size in rendered units.
    pub size: Vec2,
    /// Facing direction, which selects the sprite sheet row.
    pub direction: Direction,
    /// Layer the item is drawn on.
    pub render_group: RenderGroup,
}

impl RenderItem {
    /// Sprite sheet row matching the facing direction.
    #[must_use]
    pub const fn sprite_row(&self) -> u32 {
        self.direction as u32
    }
}

/// Scene description combining the grid and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid the scene is laid out on.
    pub tile_grid: TileGridPresentation,
    /// Index of the simulation tick the scene was captured on.
    pub tick: u64,
    items: Vec<RenderItem>,
}

impl Scene {
    /// Creates a scene, ordering items back to front.
    ///
    /// Items are sorted by render group, then by entity id.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation, tick: u64, mut items: Vec<RenderItem>) -> Self {
        items.sort_by_key(|item| (item.render_group, item.entity));
        Self {
            tile_grid,
            tick,
            items,
        }
    }

    /// Items in draw order.
    #[must_use]
    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    /// Item drawn last at the provided cell, if any.
    #[must_use]
    pub fn topmost_at(&self, cell: CellCoord) -> Option<&RenderItem> {
        self.items.iter().rev().find(|item| item.cell == cell)
    }
}

/// Rendering backend capable of presenting Tilewalk scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile size must be positive and finite.
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile size must be positive and finite, got {tile_size}")
            }
        }
    }
}

impl Error for RenderingError {}
