#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Tilewalk world.
//!
//! A [`Scenario`] describes the grid and the roster of entities that inhabit
//! it. Scenarios come either from the built-in default roster or from a TOML
//! document:
//!
//! ```toml
//! version = 1
//! columns = 8
//! rows = 6
//! seed = 42
//!
//! [[entity]]
//! name = "guard"
//! cell = { column = 0, row = 3 }
//! direction = "right"
//! behavior = { type = "patrol", axis = "horizontal" }
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tilewalk_core::{CellCoord, CollisionKind, Direction, EntityKind, Event, WELCOME_BANNER};
use tilewalk_world::{self as world, query, Axis, Behavior, Command, EntitySpec, SimulationConfig, World, WorldError};

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

const DEFAULT_COLUMNS: u32 = 17;
const DEFAULT_ROWS: u32 = 13;
const DEFAULT_ROSTER: [&str; 8] = [
    "hero",
    "enemy",
    "blue",
    "vampire",
    "swashbuckle",
    "angel",
    "samuari",
    "black",
];

/// Errors raised while loading or applying a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The document is not valid scenario TOML.
    #[error("failed to parse scenario toml")]
    Parse(#[from] toml::de::Error),
    /// The document declares a format version this build does not understand.
    #[error("unsupported scenario version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the document.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// The grid has no cells.
    #[error("scenario grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Declared number of columns.
        columns: u32,
        /// Declared number of rows.
        rows: u32,
    },
    /// An entity entry has an empty name.
    #[error("entity entry {index} has an empty name")]
    UnnamedEntity {
        /// Position of the entry in the roster.
        index: usize,
    },
    /// An entity spawns outside the grid.
    #[error("entity `{name}` spawns at ({column}, {row}) outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Name of the offending entity.
        name: String,
        /// Spawn column.
        column: u32,
        /// Spawn row.
        row: u32,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// Two entities share a spawn cell.
    #[error("entities `{first}` and `{second}` share spawn cell ({column}, {row})")]
    SharedCell {
        /// Entity listed first.
        first: String,
        /// Entity listed second.
        second: String,
        /// Shared column.
        column: u32,
        /// Shared row.
        row: u32,
    },
    /// The target world was built with different dimensions.
    #[error("world grid is {actual_columns}x{actual_rows} but the scenario expects {columns}x{rows}")]
    GridMismatch {
        /// Columns expected by the scenario.
        columns: u32,
        /// Rows expected by the scenario.
        rows: u32,
        /// Columns of the world grid.
        actual_columns: u32,
        /// Rows of the world grid.
        actual_rows: u32,
    },
    /// The world refused to spawn an entity.
    #[error("failed to spawn entity `{name}`")]
    Spawn {
        /// Name of the entity.
        name: String,
        /// Underlying world failure.
        #[source]
        source: WorldError,
    },
}

/// Axis names accepted in scenario files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSpec {
    /// Walk between the top and bottom rows.
    Vertical,
    /// Walk between the leftmost and rightmost columns.
    Horizontal,
}

impl From<AxisSpec> for Axis {
    fn from(value: AxisSpec) -> Self {
        match value {
            AxisSpec::Vertical => Axis::Vertical,
            AxisSpec::Horizontal => Axis::Horizontal,
        }
    }
}

/// Behavior declared for an entity in a scenario file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorSpec {
    /// No behavior; the entity never acts.
    #[default]
    Idle,
    /// Wander between random destinations.
    WanderMap,
    /// Patrol along an axis.
    Patrol {
        /// Axis to patrol along.
        axis: AxisSpec,
    },
    /// Walk in one fixed direction.
    MoveDirection {
        /// Direction to walk in.
        direction: Direction,
    },
}

impl BehaviorSpec {
    fn build(self) -> Option<Behavior> {
        match self {
            Self::Idle => None,
            Self::WanderMap => Some(Behavior::wander_map()),
            Self::Patrol { axis } => Some(Behavior::patrol(axis.into())),
            Self::MoveDirection { direction } => Some(Behavior::move_direction(direction)),
        }
    }
}

/// Single roster entry of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityEntry {
    name: String,
    #[serde(default)]
    sprite: Option<String>,
    cell: CellCoord,
    #[serde(default)]
    behavior: BehaviorSpec,
    #[serde(default)]
    collision: CollisionKind,
    #[serde(default)]
    direction: Direction,
    #[serde(default)]
    kind: EntityKind,
}

impl EntityEntry {
    /// Creates a solid, down-facing NPC entry without behavior.
    #[must_use]
    pub fn new(name: impl Into<String>, cell: CellCoord) -> Self {
        Self {
            name: name.into(),
            sprite: None,
            cell,
            behavior: BehaviorSpec::Idle,
            collision: CollisionKind::Solid,
            direction: Direction::Down,
            kind: EntityKind::Npc,
        }
    }

    /// Replaces the sprite identifier.
    #[must_use]
    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    /// Replaces the behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorSpec) -> Self {
        self.behavior = behavior;
        self
    }

    /// Display name of the entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sprite identifier; falls back to the name when unset.
    #[must_use]
    pub fn sprite(&self) -> &str {
        self.sprite.as_deref().unwrap_or(self.name.as_str())
    }

    /// Spawn cell.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Declared behavior.
    #[must_use]
    pub const fn behavior(&self) -> BehaviorSpec {
        self.behavior
    }

    /// Converts the entry into a world spawn description.
    #[must_use]
    pub fn to_spec(&self) -> EntitySpec {
        let spec = EntitySpec::new(self.name.clone(), self.cell)
            .with_sprite(self.sprite())
            .with_collision(self.collision)
            .with_direction(self.direction)
            .with_kind(self.kind);
        match self.behavior.build() {
            Some(behavior) => spec.with_behavior(behavior),
            None => spec,
        }
    }
}

/// Grid dimensions and roster used to populate a world.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    version: u32,
    columns: u32,
    rows: u32,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default, rename = "entity")]
    entities: Vec<EntityEntry>,
}

impl Scenario {
    /// Creates an empty scenario with the provided grid dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            version: SUPPORTED_SCENARIO_VERSION,
            columns,
            rows,
            seed: None,
            entities: Vec::new(),
        }
    }

    /// Eight wandering NPCs spread along the top row of a 17x13 map.
    #[must_use]
    pub fn default_roster() -> Self {
        let entities = DEFAULT_ROSTER
            .iter()
            .zip((1..DEFAULT_COLUMNS).step_by(2))
            .map(|(name, column)| {
                EntityEntry::new(*name, CellCoord::new(column, 0))
                    .with_sprite(format!("assets/{name}.png"))
                    .with_behavior(BehaviorSpec::WanderMap)
            })
            .collect();
        Self {
            entities,
            ..Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
        }
    }

    /// Parses and validates a scenario from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(contents)?;
        if scenario.version != SUPPORTED_SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion {
                found: scenario.version,
                expected: SUPPORTED_SCENARIO_VERSION,
            });
        }
        scenario.validate()?;
        Ok(scenario)
    }

    /// Appends an entry to the roster.
    #[must_use]
    pub fn with_entity(mut self, entry: EntityEntry) -> Self {
        self.entities.push(entry);
        self
    }

    /// Replaces the seed handed to the world.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resizes the grid, re-validating the roster against the new bounds.
    pub fn with_dimensions(mut self, columns: u32, rows: u32) -> Result<Self, ScenarioError> {
        self.columns = columns;
        self.rows = rows;
        self.validate()?;
        Ok(self)
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Seed requested by the scenario, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Roster entries in spawn order.
    #[must_use]
    pub fn entities(&self) -> &[EntityEntry] {
        &self.entities
    }

    /// World configuration matching the scenario's grid and seed.
    #[must_use]
    pub fn simulation_config(&self) -> SimulationConfig {
        let config = SimulationConfig::new(self.columns, self.rows);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Checks that the grid is non-empty and every entity has its own in-bounds cell.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ScenarioError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let mut claimed: HashMap<CellCoord, &str> = HashMap::with_capacity(self.entities.len());
        for (index, entry) in self.entities.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ScenarioError::UnnamedEntity { index });
            }
            let cell = entry.cell;
            if cell.column() >= self.columns || cell.row() >= self.rows {
                return Err(ScenarioError::OutOfBounds {
                    name: entry.name.clone(),
                    column: cell.column(),
                    row: cell.row(),
                    columns: self.columns,
                    rows: self.rows,
                });
            }
            if let Some(first) = claimed.insert(cell, entry.name.as_str()) {
                return Err(ScenarioError::SharedCell {
                    first: first.to_owned(),
                    second: entry.name.clone(),
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::default_roster()
    }
}

/// Produces data required to start a simulation.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        WELCOME_BANNER
    }

    /// Spawns every roster entry into `world` in listed order.
    ///
    /// Returns the number of spawned entities.
    pub fn populate(
        &self,
        world: &mut World,
        scenario: &Scenario,
        out_events: &mut Vec<Event>,
    ) -> Result<usize, ScenarioError> {
        let (actual_columns, actual_rows) = query::grid(world).dimensions();
        if (actual_columns, actual_rows) != (scenario.columns, scenario.rows) {
            return Err(ScenarioError::GridMismatch {
                columns: scenario.columns,
                rows: scenario.rows,
                actual_columns,
                actual_rows,
            });
        }

        for entry in &scenario.entities {
            tracing::debug!(name = entry.name(), cell = ?entry.cell(), "spawning roster entry");
            world::apply(world, Command::Spawn(entry.to_spec()), out_events).map_err(|source| {
                ScenarioError::Spawn {
                    name: entry.name.clone(),
                    source,
                }
            })?;
        }

        tracing::info!(
            entities = scenario.entities.len(),
            columns = scenario.columns,
            rows = scenario.rows,
            "world populated"
        );
        Ok(scenario.entities.len())
    }

    /// Builds a world from `config` and populates it with the scenario roster.
    pub fn build_world(
        &self,
        scenario: &Scenario,
        config: SimulationConfig,
        out_events: &mut Vec<Event>,
    ) -> Result<World, ScenarioError> {
        let mut world = World::new(config);
        let _ = self.populate(&mut world, scenario, out_events)?;
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_lines_up_along_the_top_row() {
        let scenario = Scenario::default_roster();

        assert_eq!((scenario.columns(), scenario.rows()), (17, 13));
        let cells: Vec<_> = scenario.entities().iter().map(EntityEntry::cell).collect();
        let expected: Vec<_> = (0..8).map(|index| CellCoord::new(1 + index * 2, 0)).collect();
        assert_eq!(cells, expected);
        assert_eq!(scenario.entities()[0].sprite(), "assets/hero.png");
        assert_eq!(scenario.entities()[7].name(), "black");
        assert!(scenario
            .entities()
            .iter()
            .all(|entry| entry.behavior() == BehaviorSpec::WanderMap));
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn parses_every_behavior_kind() {
        let contents = r#"
            version = 1
            columns = 6
            rows = 4
            seed = 99

            [[entity]]
            name = "walker"
            cell = { column = 0, row = 0 }
            behavior = { type = "wander_map" }

            [[entity]]
            name = "guard"
            sprite = "assets/guard.png"
            cell = { column = 5, row = 0 }
            direction = "down"
            behavior = { type = "patrol", axis = "vertical" }

            [[entity]]
            name = "runner"
            cell = { column = 0, row = 3 }
            behavior = { type = "move_direction", direction = "right" }

            [[entity]]
            name = "sparkle"
            cell = { column = 2, row = 2 }
            collision = "passable"
            kind = "effect"
        "#;

        let scenario = Scenario::from_toml_str(contents).expect("valid scenario");

        assert_eq!(scenario.seed(), Some(99));
        let behaviors: Vec<_> = scenario.entities().iter().map(EntityEntry::behavior).collect();
        assert_eq!(
            behaviors,
            vec![
                BehaviorSpec::WanderMap,
                BehaviorSpec::Patrol {
                    axis: AxisSpec::Vertical
                },
                BehaviorSpec::MoveDirection {
                    direction: Direction::Right
                },
                BehaviorSpec::Idle,
            ]
        );
        assert_eq!(scenario.entities()[0].sprite(), "walker");
        assert_eq!(scenario.entities()[1].sprite(), "assets/guard.png");
        assert_eq!(scenario.simulation_config().seed(), 99);
    }

    #[test]
    fn rejects_unknown_versions() {
        let result = Scenario::from_toml_str("version = 2\ncolumns = 3\nrows = 3\n");
        assert!(matches!(
            result,
            Err(ScenarioError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = Scenario::from_toml_str("version = 1\ncolumns = 3\nrows = 3\nspeed = 4\n");
        assert!(matches!(result, Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn rejects_entities_outside_the_grid() {
        let scenario = Scenario::new(3, 3).with_entity(EntityEntry::new("lost", CellCoord::new(3, 1)));
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::OutOfBounds { column: 3, row: 1, .. })
        ));
    }

    #[test]
    fn rejects_shared_spawn_cells() {
        let cell = CellCoord::new(1, 1);
        let scenario = Scenario::new(3, 3)
            .with_entity(EntityEntry::new("a", cell))
            .with_entity(EntityEntry::new("b", cell));

        match scenario.validate() {
            Err(ScenarioError::SharedCell { first, second, .. }) => {
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected validation result {other:?}"),
        }
    }

    #[test]
    fn shrinking_below_the_roster_fails() {
        let result = Scenario::default_roster().with_dimensions(10, 13);
        assert!(matches!(result, Err(ScenarioError::OutOfBounds { .. })));
        assert!(matches!(
            Scenario::new(3, 3).with_dimensions(0, 3),
            Err(ScenarioError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn populate_spawns_the_roster_in_order() {
        let scenario = Scenario::default_roster();
        let mut events = Vec::new();

        let world = Bootstrap
            .build_world(&scenario, scenario.simulation_config(), &mut events)
            .expect("default roster fits");

        assert_eq!(events.len(), 8);
        let names: Vec<_> = query::entities(&world).iter().map(|entity| entity.name().to_owned()).collect();
        assert_eq!(names, DEFAULT_ROSTER.map(str::to_owned).to_vec());
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn populate_rejects_mismatched_worlds() {
        let scenario = Scenario::new(4, 4);
        let mut world = World::new(SimulationConfig::new(5, 4));
        let mut events = Vec::new();

        let result = Bootstrap.populate(&mut world, &scenario, &mut events);

        assert!(matches!(
            result,
            Err(ScenarioError::GridMismatch {
                actual_columns: 5,
                ..
            })
        ));
    }

    #[test]
    fn welcome_banner_matches_core() {
        assert_eq!(Bootstrap.welcome_banner(), WELCOME_BANNER);
    }
}
