#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilewalk simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems that observe it, and the adapters that present it. The
//! world mutates grid occupancy and entity state while ticking, then reports
//! what happened through [`Event`] values so systems can react
//! deterministically without reaching into world internals.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tilewalk.";

/// Events broadcast by the world while it processes commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just started, counting from one.
        tick: u64,
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an entity was placed onto the grid.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Cell the entity occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that a behavior produced a new action for an idle entity.
    ActionAssigned {
        /// Entity that received the action.
        entity: EntityId,
        /// Kind of action that was assigned.
        action: ActionKind,
    },
    /// Reports that a behavior computed a fresh path.
    PathPlanned {
        /// Entity that requested the path.
        entity: EntityId,
        /// Cell the path leads to.
        destination: CellCoord,
        /// Number of single-cell steps on the path.
        steps: u32,
    },
    /// Reports that no route exists toward the chosen destination.
    PathNotFound {
        /// Entity that requested the path.
        entity: EntityId,
        /// Cell that could not be reached.
        destination: CellCoord,
    },
    /// Reports that an entity declined to step because the next cell was blocked.
    StepBlocked {
        /// Entity that attempted the step.
        entity: EntityId,
        /// Cell that was blocked.
        cell: CellCoord,
    },
    /// Confirms that an entity finished moving between two cells.
    EntityAdvanced {
        /// Entity that moved.
        entity: EntityId,
        /// Cell the entity occupied before the move.
        from: CellCoord,
        /// Cell the entity occupies after the move.
        to: CellCoord,
    },
    /// Reports that a move was dropped because its reservation was lost.
    MoveAbandoned {
        /// Entity whose move was dropped.
        entity: EntityId,
        /// Destination that was no longer reserved for the entity.
        destination: CellCoord,
    },
}

/// Discriminates the kinds of actions an entity may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Idle for a number of frames or a duration.
    Wait,
    /// Animate toward an adjacent cell.
    Move,
}

/// Facing directions available to entities.
///
/// Discriminants follow the sprite sheet row order used by renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Facing toward increasing row indices.
    #[default]
    Down = 0,
    /// Facing toward decreasing column indices.
    Left = 1,
    /// Facing toward increasing column indices.
    Right = 2,
    /// Facing toward decreasing row indices.
    Up = 3,
}

impl Direction {
    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
        }
    }

    /// Column and row deltas applied when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
        }
    }

    /// Direction of a single orthogonal step between two cells, if they are adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        if from.manhattan_distance(to) != 1 {
            return None;
        }

        if to.column() > from.column() {
            Some(Self::Right)
        } else if to.column() < from.column() {
            Some(Self::Left)
        } else if to.row() > from.row() {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant. The
    /// upper bounds depend on the grid and are checked by the caller.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::Down => (Some(self.column), self.row.checked_add(1)),
            Direction::Left => (self.column.checked_sub(1), Some(self.row)),
            Direction::Right => (self.column.checked_add(1), Some(self.row)),
            Direction::Up => (Some(self.column), self.row.checked_sub(1)),
        };
        Some(CellCoord::new(column?, row?))
    }
}

/// Describes whether an occupant blocks other entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// Blocks pathfinding and occupancy checks.
    #[default]
    Solid,
    /// Other entities may path through the occupied tile.
    Passable,
}

/// Broad classification of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Entity steered by player input.
    Player,
    /// Entity steered by an autonomous behavior.
    #[default]
    Npc,
    /// Short-lived visual effect.
    Effect,
}

/// Layer a renderer draws an entity on, back to front.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderGroup {
    /// Terrain and floor decoration.
    Background,
    /// Regular entities.
    #[default]
    Entity,
    /// Decoration drawn above entities.
    Foreground,
    /// Interface overlays.
    Ui,
}

/// Player controls recognised by the input mapper.
///
/// Player-driven behaviors rely on these values staying stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Move or face up.
    Up,
    /// Move or face down.
    Down,
    /// Move or face left.
    Left,
    /// Move or face right.
    Right,
    /// Interact with whatever is in front of the player.
    Interact,
}

impl Control {
    /// Facing direction associated with a directional control.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Interact => None,
        }
    }
}
