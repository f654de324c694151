//! Decision policies that pick the next action for an idle entity.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tilewalk_core::{CellCoord, Direction, Event};

use crate::{
    action::{Action, Move},
    config::SimulationConfig,
    entity::Entity,
    grid::{Grid, GridError},
    pathfinder::{Path, Pathfinder},
};

/// Shared resources a behavior may consult while deciding.
pub(crate) struct DecisionContext<'a> {
    pub(crate) grid: &'a mut Grid,
    pub(crate) pathfinder: &'a mut Pathfinder,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) config: &'a SimulationConfig,
    pub(crate) events: &'a mut Vec<Event>,
}

/// Axis a patrolling entity walks along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Walks between the top and bottom rows.
    #[default]
    Vertical,
    /// Walks between the leftmost and rightmost columns.
    Horizontal,
}

impl Axis {
    /// Direction of increasing coordinate along the axis.
    #[must_use]
    pub const fn positive(self) -> Direction {
        match self {
            Self::Vertical => Direction::Down,
            Self::Horizontal => Direction::Right,
        }
    }

    /// Direction of decreasing coordinate along the axis.
    #[must_use]
    pub const fn negative(self) -> Direction {
        self.positive().opposite()
    }

    fn position(self, cell: CellCoord) -> u32 {
        match self {
            Self::Vertical => cell.row(),
            Self::Horizontal => cell.column(),
        }
    }

    fn extent(self, grid: &Grid) -> u32 {
        match self {
            Self::Vertical => grid.rows(),
            Self::Horizontal => grid.columns(),
        }
    }
}

/// Walks to random destinations across the whole map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WanderMap {
    path: Path,
}

impl WanderMap {
    /// Remaining cells of the cached route, excluding the entity's own cell.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decide(&mut self, entity: &Entity, ctx: &mut DecisionContext<'_>) -> Result<Action, GridError> {
        let id = entity.id();
        let cell = entity.cell();

        if self.path.is_empty() {
            let (columns, rows) = ctx.grid.dimensions();
            if columns == 0 || rows == 0 {
                return Ok(Action::wait_frames(0));
            }
            let destination = CellCoord::new(ctx.rng.gen_range(0..columns), ctx.rng.gen_range(0..rows));
            if destination == cell {
                return Ok(Action::wait_frames(0));
            }

            let Some(mut path) = ctx.pathfinder.find_path(ctx.grid, cell, destination) else {
                tracing::debug!(
                    entity = id.get(),
                    ?destination,
                    expansions = ctx.pathfinder.last_expansions(),
                    "no path to wander destination"
                );
                ctx.events.push(Event::PathNotFound { entity: id, destination });
                return Ok(Action::wait_frames(0));
            };

            let _ = path.pop_front();
            let steps = u32::try_from(path.len()).unwrap_or(u32::MAX);
            tracing::debug!(entity = id.get(), ?destination, steps, "planned wander route");
            ctx.events.push(Event::PathPlanned {
                entity: id,
                destination,
                steps,
            });
            self.path = path;
        }

        let Some(next) = self.path.front() else {
            return Ok(Action::wait_frames(0));
        };

        let blocked = ctx.grid.is_blocked(next)?;
        if blocked || cell.manhattan_distance(next) != 1 {
            self.path.clear();
            if blocked {
                ctx.events.push(Event::StepBlocked { entity: id, cell: next });
            }
            return Ok(Action::wait_frames(0));
        }

        let _ = self.path.pop_front();
        ctx.grid.set_occupant(next, Some(entity.occupant()))?;
        Ok(Action::Move(Move::new(
            next,
            ctx.config.walk_speed(),
            ctx.config.tile_size(),
        )))
    }
}

/// Walks back and forth along one axis, turning at the grid edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patrol {
    axis: Axis,
    speed: Option<f32>,
}

impl Patrol {
    /// Creates a patrol along the provided axis.
    #[must_use]
    pub const fn new(axis: Axis) -> Self {
        Self { axis, speed: None }
    }

    /// Axis the patrol walks along.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Speed drawn for the current leg, if one has been drawn.
    #[must_use]
    pub const fn speed(&self) -> Option<f32> {
        self.speed
    }

    fn decide(&mut self, entity: &mut Entity, ctx: &mut DecisionContext<'_>) -> Result<Action, GridError> {
        let positive = self.axis.positive();
        let negative = self.axis.negative();
        let cell = entity.cell();

        let mut facing = entity.direction();
        if facing != positive && facing != negative {
            facing = positive;
        }

        let position = self.axis.position(cell);
        let last = self.axis.extent(ctx.grid).saturating_sub(1);
        if position == 0 {
            facing = positive;
            self.speed = None;
        } else if position >= last {
            facing = negative;
            self.speed = None;
        }
        entity.set_direction(facing);

        let wait = Action::wait_frames(ctx.config.blocked_wait_frames());
        let Some(next) = cell.step(facing).filter(|next| ctx.grid.in_bounds(*next)) else {
            return Ok(wait);
        };
        if ctx.grid.is_blocked(next)? {
            tracing::trace!(entity = entity.id().get(), ?next, "patrol step blocked");
            ctx.events.push(Event::StepBlocked {
                entity: entity.id(),
                cell: next,
            });
            return Ok(wait);
        }

        let speed = match self.speed {
            Some(speed) => speed,
            None => {
                let (min, max) = ctx.config.patrol_speed();
                let speed = ctx.rng.gen_range(min..=max) as f32;
                self.speed = Some(speed);
                speed
            }
        };

        ctx.grid.set_occupant(next, Some(entity.occupant()))?;
        Ok(Action::Move(Move::new(next, speed, ctx.config.tile_size())))
    }
}

/// Keeps stepping in one fixed direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveDirection {
    direction: Direction,
}

impl MoveDirection {
    /// Creates a walker heading in the provided direction.
    #[must_use]
    pub const fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Direction the walker heads in.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    fn decide(&self, entity: &mut Entity, ctx: &mut DecisionContext<'_>) -> Result<Action, GridError> {
        entity.set_direction(self.direction);
        let Some(next) = entity
            .cell()
            .step(self.direction)
            .filter(|next| ctx.grid.in_bounds(*next))
        else {
            return Ok(Action::wait_frames(0));
        };
        if ctx.grid.is_blocked(next)? {
            ctx.events.push(Event::StepBlocked {
                entity: entity.id(),
                cell: next,
            });
            return Ok(Action::wait_frames(0));
        }

        ctx.grid.set_occupant(next, Some(entity.occupant()))?;
        Ok(Action::Move(Move::new(
            next,
            ctx.config.walk_speed(),
            ctx.config.tile_size(),
        )))
    }
}

/// Policy consulted whenever its entity has no action in progress.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Wander between random destinations using the pathfinder.
    WanderMap(WanderMap),
    /// Patrol along an axis.
    Patrol(Patrol),
    /// Walk in a fixed direction.
    MoveDirection(MoveDirection),
}

impl Behavior {
    /// Creates a map wanderer with no cached route.
    #[must_use]
    pub fn wander_map() -> Self {
        Self::WanderMap(WanderMap::default())
    }

    /// Creates a patrol along the provided axis.
    #[must_use]
    pub const fn patrol(axis: Axis) -> Self {
        Self::Patrol(Patrol::new(axis))
    }

    /// Creates a fixed-direction walker.
    #[must_use]
    pub const fn move_direction(direction: Direction) -> Self {
        Self::MoveDirection(MoveDirection::new(direction))
    }

    /// Chooses the next action for `entity`.
    ///
    /// A returned move has already reserved its destination tile.
    pub(crate) fn decide(
        &mut self,
        entity: &mut Entity,
        ctx: &mut DecisionContext<'_>,
    ) -> Result<Action, GridError> {
        match self {
            Self::WanderMap(wander) => wander.decide(entity, ctx),
            Self::Patrol(patrol) => patrol.decide(entity, ctx),
            Self::MoveDirection(walker) => walker.decide(entity, ctx),
        }
    }

    /// Drops any cached plan so the next decision starts fresh.
    pub(crate) fn invalidate(&mut self) {
        if let Self::WanderMap(wander) = self {
            wander.path.clear();
        }
    }
}
