//! Tunable parameters for a simulation run.

const DEFAULT_COLUMNS: u32 = 17;
const DEFAULT_ROWS: u32 = 13;
const DEFAULT_TILE_SIZE: f32 = 64.0;
const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const DEFAULT_WALK_SPEED: f32 = 1.0;
const DEFAULT_PATROL_SPEED_MIN: u32 = 1;
const DEFAULT_PATROL_SPEED_MAX: u32 = 3;
const DEFAULT_BLOCKED_WAIT_FRAMES: u32 = 1;

/// Configuration parameters required to construct a world.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    columns: u32,
    rows: u32,
    tile_size: f32,
    seed: u64,
    walk_speed: f32,
    patrol_speed_min: u32,
    patrol_speed_max: u32,
    blocked_wait_frames: u32,
}

impl SimulationConfig {
    /// Creates a configuration for a grid with the provided dimensions.
    ///
    /// Every other parameter starts from its default value.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            tile_size: DEFAULT_TILE_SIZE,
            seed: DEFAULT_SEED,
            walk_speed: DEFAULT_WALK_SPEED,
            patrol_speed_min: DEFAULT_PATROL_SPEED_MIN,
            patrol_speed_max: DEFAULT_PATROL_SPEED_MAX,
            blocked_wait_frames: DEFAULT_BLOCKED_WAIT_FRAMES,
        }
    }

    /// Replaces the seed feeding every randomised behavior decision.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the side length of a tile measured in rendered units.
    #[must_use]
    pub const fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Replaces the speed used by path-following and fixed-direction walkers.
    #[must_use]
    pub const fn with_walk_speed(mut self, walk_speed: f32) -> Self {
        self.walk_speed = walk_speed;
        self
    }

    /// Replaces the inclusive range patrol speeds are drawn from.
    ///
    /// Bounds are reordered when given backwards and raised to at least one.
    #[must_use]
    pub fn with_patrol_speed(mut self, min: u32, max: u32) -> Self {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.patrol_speed_min = low.max(1);
        self.patrol_speed_max = high.max(1);
        self
    }

    /// Replaces the number of frames a patrol waits after finding its next cell blocked.
    #[must_use]
    pub const fn with_blocked_wait_frames(mut self, frames: u32) -> Self {
        self.blocked_wait_frames = frames;
        self
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile measured in rendered units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Seed used to initialise the world's random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Rendered units per tick covered by path-following walkers.
    #[must_use]
    pub const fn walk_speed(&self) -> f32 {
        self.walk_speed
    }

    /// Inclusive bounds patrol speeds are drawn from.
    #[must_use]
    pub const fn patrol_speed(&self) -> (u32, u32) {
        (self.patrol_speed_min, self.patrol_speed_max)
    }

    /// Frames a patrol waits before retrying a blocked step.
    #[must_use]
    pub const fn blocked_wait_frames(&self) -> u32 {
        self.blocked_wait_frames
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationConfig;

    #[test]
    fn defaults_match_reference_map() {
        let config = SimulationConfig::default();
        assert_eq!(config.columns(), 17);
        assert_eq!(config.rows(), 13);
        assert_eq!(config.tile_size(), 64.0);
        assert_eq!(config.patrol_speed(), (1, 3));
        assert_eq!(config.blocked_wait_frames(), 1);
    }

    #[test]
    fn patrol_speed_bounds_are_normalised() {
        let config = SimulationConfig::new(4, 4).with_patrol_speed(5, 0);
        assert_eq!(config.patrol_speed(), (1, 5));
    }
}
