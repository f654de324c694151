#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tilewalk.
//!
//! The world owns the occupancy grid, every entity and the seeded random
//! source. Adapters drive it exclusively through [`apply`] and observe it
//! through the [`query`] module and the emitted [`Event`] stream.

mod action;
mod behavior;
mod config;
mod entity;
mod grid;
mod pathfinder;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tilewalk_core::{CollisionKind, EntityId, Event};

pub use action::{Action, ActionStatus, Move, Wait, WaitFor};
pub use behavior::{Axis, Behavior, MoveDirection, Patrol, WanderMap};
pub use config::SimulationConfig;
pub use entity::{cell_origin, Entity, EntitySpec};
pub use grid::{Grid, GridError, GridTile, Occupant};
pub use pathfinder::{Path, Pathfinder};

use behavior::DecisionContext;
use query::EntitySnapshot;

/// Errors surfaced while applying commands or auditing the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A grid access failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Tiles and entities disagree about who stands where.
    #[error("world invariant violated: {0}")]
    InvariantViolation(String),
    /// No further entity identifiers are available.
    #[error("entity identifiers exhausted")]
    EntityLimit,
}

/// Commands accepted by [`apply`].
#[derive(Clone, Debug)]
pub enum Command {
    /// Places a new entity onto the grid.
    Spawn(EntitySpec),
    /// Advances the simulation by one tick.
    Tick {
        /// Simulated time covered by the tick.
        dt: Duration,
    },
}

/// Represents the authoritative Tilewalk world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    grid: Grid,
    entities: Vec<Entity>,
    pathfinder: Pathfinder,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates an empty world sized and seeded from the configuration.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            grid: Grid::new(config.columns(), config.rows()),
            entities: Vec::new(),
            pathfinder: Pathfinder::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            tick_index: 0,
            config,
        }
    }

    /// Audits that every tile agrees with the entity it references.
    ///
    /// Solid entities must be referenced by the tile under them, and every
    /// referenced entity must either stand on the tile or be moving onto it.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for entity in &self.entities {
            let occupant = self.grid.occupant(entity.cell())?;
            if entity.collision() == CollisionKind::Solid
                && occupant.map(|occupant| occupant.entity()) != Some(entity.id())
            {
                return Err(WorldError::InvariantViolation(format!(
                    "entity {} is not referenced by its cell {:?}",
                    entity.id().get(),
                    entity.cell()
                )));
            }
        }

        for tile in self.grid.tiles() {
            let Some(occupant) = tile.occupant() else {
                continue;
            };
            let Some(entity) = self.entity(occupant.entity()) else {
                return Err(WorldError::InvariantViolation(format!(
                    "tile {:?} references unknown entity {}",
                    tile.cell(),
                    occupant.entity().get()
                )));
            };
            let inbound = matches!(
                entity.action(),
                Some(Action::Move(step)) if step.destination() == tile.cell()
            );
            if entity.cell() != tile.cell() && !inbound {
                return Err(WorldError::InvariantViolation(format!(
                    "tile {:?} references entity {} standing on {:?}",
                    tile.cell(),
                    entity.id().get(),
                    entity.cell()
                )));
            }
        }

        Ok(())
    }

    /// Consumes the world, returning the final entity states.
    #[must_use]
    pub fn teardown(self) -> Teardown {
        tracing::info!(
            ticks = self.tick_index,
            entities = self.entities.len(),
            "world torn down"
        );
        Teardown {
            ticks: self.tick_index,
            entities: self.entities.iter().map(EntitySnapshot::from_entity).collect(),
        }
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        let index = usize::try_from(id.get()).ok()?;
        self.entities.get(index)
    }

    fn spawn(&mut self, spec: EntitySpec, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let id = u32::try_from(self.entities.len()).map_err(|_| WorldError::EntityLimit)?;
        let entity = Entity::from_spec(EntityId::new(id), spec, self.config.tile_size());
        self.grid.place(entity.occupant(), entity.cell())?;

        tracing::info!(
            entity = id,
            name = entity.name(),
            cell = ?entity.cell(),
            "entity spawned"
        );
        out_events.push(Event::EntitySpawned {
            entity: entity.id(),
            cell: entity.cell(),
        });
        self.entities.push(entity);
        Ok(())
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
            dt,
        });

        let mut ctx = DecisionContext {
            grid: &mut self.grid,
            pathfinder: &mut self.pathfinder,
            rng: &mut self.rng,
            config: &self.config,
            events: out_events,
        };

        for entity in self.entities.iter_mut() {
            if entity.action.is_none() {
                if let Some(mut behavior) = entity.behavior.take() {
                    let decided = behavior.decide(entity, &mut ctx);
                    entity.behavior = Some(behavior);
                    let action = decided?;
                    ctx.events.push(Event::ActionAssigned {
                        entity: entity.id(),
                        action: action.kind(),
                    });
                    entity.action = Some(action);
                }
            }

            let Some(mut action) = entity.action.take() else {
                continue;
            };
            match action.execute(entity, ctx.grid, dt, ctx.events)? {
                ActionStatus::Active => entity.action = Some(action),
                ActionStatus::Complete => {}
                ActionStatus::Abandoned => {
                    if let Some(behavior) = entity.behavior.as_mut() {
                        behavior.invalidate();
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Final state returned when a world is torn down.
#[derive(Clone, Debug, PartialEq)]
pub struct Teardown {
    ticks: u64,
    entities: Vec<EntitySnapshot>,
}

impl Teardown {
    /// Number of ticks the world processed.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Final entity snapshots in spawn order.
    #[must_use]
    pub fn entities(&self) -> &[EntitySnapshot] {
        &self.entities
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Entities are evaluated in spawn order; earlier entities win contested cells.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
    match command {
        Command::Spawn(spec) => world.spawn(spec, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use tilewalk_core::{ActionKind, CellCoord, CollisionKind, Direction, EntityId, EntityKind, RenderGroup};

    use super::{Entity, Grid, SimulationConfig, World};

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Provides read-only access to the occupancy grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Entities in spawn order.
    #[must_use]
    pub fn entities(world: &World) -> &[Entity] {
        &world.entities
    }

    /// Looks up a single entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.entity(id)
    }

    /// Captures a read-only view of every entity for presentation.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView {
            snapshots: world.entities.iter().map(EntitySnapshot::from_entity).collect(),
        }
    }

    /// Read-only snapshot describing all entities.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EntityView {
        snapshots: Vec<EntitySnapshot>,
    }

    impl EntityView {
        /// Iterator over the captured snapshots in spawn order.
        pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured snapshots.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the view holds no entities.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EntitySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single entity's state.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EntitySnapshot {
        /// Identifier of the entity.
        pub id: EntityId,
        /// Display name.
        pub name: String,
        /// Sprite identifier.
        pub sprite: String,
        /// Authoritative cell.
        pub cell: CellCoord,
        /// Continuous position in rendered units.
        pub rendered_position: Vec2,
        /// Facing direction.
        pub direction: Direction,
        /// Bounding box size in rendered units.
        pub size: Vec2,
        /// Layer the entity is drawn on.
        pub render_group: RenderGroup,
        /// Classification of the entity.
        pub kind: EntityKind,
        /// Collision kind of the entity.
        pub collision: CollisionKind,
        /// Kind of the action in progress, if any.
        pub action: Option<ActionKind>,
    }

    impl EntitySnapshot {
        pub(crate) fn from_entity(entity: &Entity) -> Self {
            Self {
                id: entity.id(),
                name: entity.name().to_owned(),
                sprite: entity.sprite().to_owned(),
                cell: entity.cell(),
                rendered_position: entity.rendered_position(),
                direction: entity.direction(),
                size: entity.size(),
                render_group: entity.render_group(),
                kind: entity.kind(),
                collision: entity.collision(),
                action: entity.action().map(|action| action.kind()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewalk_core::{ActionKind, CellCoord, Direction};

    const DT: Duration = Duration::from_millis(16);

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        apply(world, Command::Tick { dt: DT }, events).expect("tick succeeds");
        world.check_invariants().expect("world stays consistent");
    }

    #[test]
    fn spawn_places_entities_in_order() {
        let mut world = World::new(SimulationConfig::new(4, 4));
        let mut events = Vec::new();

        for (index, column) in [0, 2].into_iter().enumerate() {
            let spec = EntitySpec::new(format!("npc-{index}"), CellCoord::new(column, 1));
            apply(&mut world, Command::Spawn(spec), &mut events).expect("free cell");
        }

        assert_eq!(
            events,
            vec![
                Event::EntitySpawned {
                    entity: EntityId::new(0),
                    cell: CellCoord::new(0, 1),
                },
                Event::EntitySpawned {
                    entity: EntityId::new(1),
                    cell: CellCoord::new(2, 1),
                },
            ]
        );
        assert_eq!(query::entities(&world).len(), 2);
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn spawn_rejects_occupied_and_outside_cells() {
        let mut world = World::new(SimulationConfig::new(2, 2));
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 1);
        apply(&mut world, Command::Spawn(EntitySpec::new("a", cell)), &mut events).expect("free cell");

        let occupied = apply(&mut world, Command::Spawn(EntitySpec::new("b", cell)), &mut events);
        assert!(matches!(
            occupied,
            Err(WorldError::Grid(GridError::Occupied { .. }))
        ));

        let outside = apply(
            &mut world,
            Command::Spawn(EntitySpec::new("c", CellCoord::new(5, 0))),
            &mut events,
        );
        assert!(matches!(
            outside,
            Err(WorldError::Grid(GridError::OutOfBounds { .. }))
        ));
        assert_eq!(query::entities(&world).len(), 1);
    }

    #[test]
    fn tick_assigns_then_executes_actions() {
        let mut world = World::new(SimulationConfig::new(3, 1));
        let mut events = Vec::new();
        let spec = EntitySpec::new("walker", CellCoord::new(0, 0))
            .with_behavior(Behavior::move_direction(Direction::Right));
        apply(&mut world, Command::Spawn(spec), &mut events).expect("free cell");
        events.clear();

        tick(&mut world, &mut events);

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { tick: 1, dt: DT },
                Event::ActionAssigned {
                    entity: EntityId::new(0),
                    action: ActionKind::Move,
                },
            ]
        );
        let walker = query::entity(&world, EntityId::new(0)).expect("spawned");
        assert_eq!(walker.cell(), CellCoord::new(0, 0));
        assert_eq!(walker.action().map(Action::kind), Some(ActionKind::Move));
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn earlier_entities_win_contested_cells() {
        let mut world = World::new(SimulationConfig::new(3, 1));
        let mut events = Vec::new();
        for (name, cell, direction) in [
            ("east", CellCoord::new(0, 0), Direction::Right),
            ("west", CellCoord::new(2, 0), Direction::Left),
        ] {
            let spec = EntitySpec::new(name, cell).with_behavior(Behavior::move_direction(direction));
            apply(&mut world, Command::Spawn(spec), &mut events).expect("free cell");
        }

        for _ in 0..200 {
            tick(&mut world, &mut events);
        }

        let cells: Vec<_> = query::entities(&world).iter().map(Entity::cell).collect();
        assert_eq!(cells, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
    }

    #[test]
    fn idle_entities_without_behavior_stay_put() {
        let mut world = World::new(SimulationConfig::new(2, 2));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Spawn(EntitySpec::new("statue", CellCoord::new(1, 0))),
            &mut events,
        )
        .expect("free cell");
        events.clear();

        tick(&mut world, &mut events);

        assert_eq!(events, vec![Event::TimeAdvanced { tick: 1, dt: DT }]);
        assert!(query::entity_view(&world)
            .iter()
            .all(|snapshot| snapshot.action.is_none()));
    }

    #[test]
    fn stolen_reservation_triggers_replanning() {
        let mut world = World::new(SimulationConfig::new(4, 4));
        let mut events = Vec::new();
        let spec = EntitySpec::new("walker", CellCoord::new(0, 0))
            .with_behavior(Behavior::move_direction(Direction::Down));
        apply(&mut world, Command::Spawn(spec), &mut events).expect("free cell");
        tick(&mut world, &mut events);

        let reserved = CellCoord::new(0, 1);
        world.grid.set_occupant(reserved, None).expect("in bounds");
        events.clear();
        apply(&mut world, Command::Tick { dt: DT }, &mut events).expect("tick succeeds");

        assert!(events.contains(&Event::MoveAbandoned {
            entity: EntityId::new(0),
            destination: reserved,
        }));
        let walker = query::entity(&world, EntityId::new(0)).expect("spawned");
        assert!(walker.action().is_none());
        assert_eq!(walker.rendered_position(), cell_origin(CellCoord::new(0, 0), 64.0));
        world.check_invariants().expect("abandoning restores consistency");
    }

    #[test]
    fn invariant_check_reports_orphaned_tiles() {
        let mut world = World::new(SimulationConfig::new(2, 2));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Spawn(EntitySpec::new("a", CellCoord::new(0, 0))),
            &mut events,
        )
        .expect("free cell");
        world
            .grid
            .set_occupant(
                CellCoord::new(1, 1),
                Some(Occupant::new(EntityId::new(9), CollisionKind::Solid)),
            )
            .expect("in bounds");

        assert!(matches!(
            world.check_invariants(),
            Err(WorldError::InvariantViolation(_))
        ));
    }

    #[test]
    fn teardown_reports_final_state() {
        let mut world = World::new(SimulationConfig::new(3, 3));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Spawn(EntitySpec::new("a", CellCoord::new(1, 1)).with_sprite("assets/a.png")),
            &mut events,
        )
        .expect("free cell");
        tick(&mut world, &mut events);
        tick(&mut world, &mut events);

        let teardown = world.teardown();

        assert_eq!(teardown.ticks(), 2);
        assert_eq!(teardown.entities().len(), 1);
        assert_eq!(teardown.entities()[0].sprite, "assets/a.png");
        assert_eq!(teardown.entities()[0].cell, CellCoord::new(1, 1));
    }
}
