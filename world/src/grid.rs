//! Dense tile grid tracking which entity occupies each cell.

use thiserror::Error;
use tilewalk_core::{CellCoord, CollisionKind, EntityId};

/// Errors raised by grid queries and mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The cell lies outside the grid.
    #[error("cell ({}, {}) lies outside the {columns}x{rows} grid", .cell.column(), .cell.row())]
    OutOfBounds {
        /// Cell that was addressed.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// The cell already holds an occupant.
    #[error("cell ({}, {}) is already occupied by entity {}", .cell.column(), .cell.row(), .occupant.get())]
    Occupied {
        /// Cell that was addressed.
        cell: CellCoord,
        /// Entity currently holding the cell.
        occupant: EntityId,
    },
}

/// Non-owning back-reference from a tile to the entity holding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    entity: EntityId,
    collision: CollisionKind,
}

impl Occupant {
    /// Creates an occupant record for the provided entity.
    #[must_use]
    pub const fn new(entity: EntityId, collision: CollisionKind) -> Self {
        Self { entity, collision }
    }

    /// Entity referenced by the tile.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Collision behaviour of the referenced entity.
    #[must_use]
    pub const fn collision(&self) -> CollisionKind {
        self.collision
    }

    /// Reports whether the occupant blocks other entities.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        matches!(self.collision, CollisionKind::Solid)
    }
}

/// Single cell of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTile {
    cell: CellCoord,
    occupant: Option<Occupant>,
}

impl GridTile {
    /// Cell the tile covers.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Entity currently associated with the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }
}

/// Fixed-size grid of tiles stored in row-major order.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<GridTile>,
}

impl Grid {
    /// Builds an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut tiles = Vec::with_capacity(capacity);
        if capacity > 0 {
            for row in 0..rows {
                for column in 0..columns {
                    tiles.push(GridTile {
                        cell: CellCoord::new(column, row),
                        occupant: None,
                    });
                }
            }
        }

        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Total number of tiles in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[GridTile] {
        &self.tiles
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Retrieves the tile covering the provided cell.
    pub fn tile(&self, cell: CellCoord) -> Result<&GridTile, GridError> {
        let index = self.checked_index(cell)?;
        Ok(&self.tiles[index])
    }

    /// Returns the occupant of the provided cell.
    pub fn occupant(&self, cell: CellCoord) -> Result<Option<Occupant>, GridError> {
        self.tile(cell).map(GridTile::occupant)
    }

    /// Reports whether a solid entity occupies the provided cell.
    ///
    /// Out-of-bounds cells are an error; callers bounds-check first.
    pub fn is_blocked(&self, cell: CellCoord) -> Result<bool, GridError> {
        let index = self.checked_index(cell)?;
        Ok(self.is_blocked_index(index))
    }

    /// Overwrites the back-reference stored in the provided cell.
    pub fn set_occupant(
        &mut self,
        cell: CellCoord,
        occupant: Option<Occupant>,
    ) -> Result<(), GridError> {
        let index = self.checked_index(cell)?;
        self.tiles[index].occupant = occupant;
        Ok(())
    }

    /// Clears the cell only while it still references the provided entity.
    ///
    /// Returns whether the tile was cleared.
    pub fn vacate_if(&mut self, cell: CellCoord, entity: EntityId) -> Result<bool, GridError> {
        let index = self.checked_index(cell)?;
        let tile = &mut self.tiles[index];
        match tile.occupant {
            Some(occupant) if occupant.entity() == entity => {
                tile.occupant = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Records the initial placement of an entity.
    ///
    /// Fails when the cell is out of bounds or already occupied.
    pub fn place(&mut self, occupant: Occupant, cell: CellCoord) -> Result<(), GridError> {
        let index = self.checked_index(cell)?;
        let tile = &mut self.tiles[index];
        if let Some(existing) = tile.occupant {
            return Err(GridError::Occupied {
                cell,
                occupant: existing.entity(),
            });
        }
        tile.occupant = Some(occupant);
        Ok(())
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn is_blocked_index(&self, index: usize) -> bool {
        self.tiles
            .get(index)
            .and_then(GridTile::occupant)
            .is_some_and(|occupant| occupant.is_solid())
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, GridError> {
        self.index(cell).ok_or(GridError::OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        })
    }
}
