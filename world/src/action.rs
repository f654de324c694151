//! Units of work an entity runs until they report completion.

use std::time::Duration;

use glam::Vec2;
use tilewalk_core::{ActionKind, CellCoord, Direction, Event};

use crate::{
    entity::{cell_origin, Entity},
    grid::{Grid, GridError},
};

const MIN_MOVE_SPEED: f32 = 0.01;

/// Outcome of running an action for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    /// The action needs further ticks.
    Active,
    /// The action finished and should be cleared.
    Complete,
    /// A move lost its reservation and gave up; the owner should replan.
    Abandoned,
}

/// Threshold a wait counts toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitFor {
    /// Completes after the given number of executions; zero completes on the first.
    Frames(u32),
    /// Completes once the accumulated tick time reaches the duration.
    Duration(Duration),
}

/// Idle action with no positional side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wait {
    limit: WaitFor,
    frames: u32,
    elapsed: Duration,
}

impl Wait {
    /// Creates a wait that counts toward the provided threshold.
    #[must_use]
    pub const fn new(limit: WaitFor) -> Self {
        Self {
            limit,
            frames: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Threshold this wait counts toward.
    #[must_use]
    pub const fn limit(&self) -> WaitFor {
        self.limit
    }

    fn advance(&mut self, dt: Duration) -> ActionStatus {
        let done = match self.limit {
            WaitFor::Frames(frames) => {
                self.frames = self.frames.saturating_add(1);
                self.frames >= frames
            }
            WaitFor::Duration(duration) => {
                self.elapsed = self.elapsed.saturating_add(dt);
                self.elapsed >= duration
            }
        };

        if done {
            ActionStatus::Complete
        } else {
            ActionStatus::Active
        }
    }
}

/// Animated step toward a destination cell.
///
/// The destination tile must already reference the mover when the move is
/// issued; both the source and the destination tile point at the entity
/// until it arrives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    destination: CellCoord,
    rendered_destination: Vec2,
    speed: f32,
    tile_size: f32,
}

impl Move {
    /// Creates a move toward `destination` covering `speed` rendered units per tick.
    ///
    /// Non-positive or non-finite speeds are raised to a small positive value so
    /// the move always terminates.
    #[must_use]
    pub fn new(destination: CellCoord, speed: f32, tile_size: f32) -> Self {
        let speed = if speed.is_finite() && speed > MIN_MOVE_SPEED {
            speed
        } else {
            MIN_MOVE_SPEED
        };
        Self {
            destination,
            rendered_destination: cell_origin(destination, tile_size),
            speed,
            tile_size,
        }
    }

    /// Cell the move ends in.
    #[must_use]
    pub const fn destination(&self) -> CellCoord {
        self.destination
    }

    /// Rendered units covered per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    fn advance(&self, entity: &mut Entity, grid: &mut Grid, events: &mut Vec<Event>) -> Result<ActionStatus, GridError> {
        let id = entity.id();
        let from = entity.cell();

        let reserved = grid
            .occupant(self.destination)?
            .is_some_and(|occupant| occupant.entity() == id);
        if !reserved {
            tracing::warn!(
                entity = id.get(),
                destination = ?self.destination,
                "move lost its reservation"
            );
            entity.set_rendered_position(cell_origin(from, self.tile_size));
            events.push(Event::MoveAbandoned {
                entity: id,
                destination: self.destination,
            });
            return Ok(ActionStatus::Abandoned);
        }

        let delta = Vec2::new(
            self.destination.column() as f32 - from.column() as f32,
            self.destination.row() as f32 - from.row() as f32,
        ) * self.speed;
        let position = entity.rendered_position();
        let remaining = position.distance(self.rendered_destination);
        let next = if remaining < self.speed {
            self.rendered_destination
        } else {
            position + delta
        };
        entity.set_rendered_position(next);
        if let Some(direction) = Direction::between(from, self.destination) {
            entity.set_direction(direction);
        }

        if next != self.rendered_destination {
            return Ok(ActionStatus::Active);
        }

        if from != self.destination {
            let _ = grid.vacate_if(from, id)?;
        }
        entity.set_cell(self.destination);
        tracing::trace!(entity = id.get(), ?from, to = ?self.destination, "move complete");
        events.push(Event::EntityAdvanced {
            entity: id,
            from,
            to: self.destination,
        });
        Ok(ActionStatus::Complete)
    }
}

/// Work bound to a single entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Idle until a frame count or duration is exhausted.
    Wait(Wait),
    /// Animate toward an adjacent cell.
    Move(Move),
}

impl Action {
    /// Creates a wait lasting the provided number of executions.
    #[must_use]
    pub const fn wait_frames(frames: u32) -> Self {
        Self::Wait(Wait::new(WaitFor::Frames(frames)))
    }

    /// Creates a wait lasting the provided amount of tick time.
    #[must_use]
    pub const fn wait_for(duration: Duration) -> Self {
        Self::Wait(Wait::new(WaitFor::Duration(duration)))
    }

    /// Discriminant of the action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Wait(_) => ActionKind::Wait,
            Self::Move(_) => ActionKind::Move,
        }
    }

    /// Runs the action for one tick on behalf of `entity`.
    pub(crate) fn execute(
        &mut self,
        entity: &mut Entity,
        grid: &mut Grid,
        dt: Duration,
        events: &mut Vec<Event>,
    ) -> Result<ActionStatus, GridError> {
        match self {
            Self::Wait(wait) => Ok(wait.advance(dt)),
            Self::Move(step) => step.advance(entity, grid, events),
        }
    }
}
