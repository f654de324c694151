#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds world events into run statistics.

use std::{fmt, time::Duration};

use tilewalk_core::{ActionKind, Event};

/// Aggregate counters describing a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimulationStats {
    ticks: u64,
    simulated: Duration,
    entities_spawned: u32,
    waits_assigned: u64,
    moves_assigned: u64,
    moves_completed: u64,
    moves_abandoned: u64,
    paths_planned: u64,
    planned_steps: u64,
    path_failures: u64,
    blocked_steps: u64,
}

impl SimulationStats {
    /// Number of ticks observed.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total simulated time across observed ticks.
    #[must_use]
    pub const fn simulated(&self) -> Duration {
        self.simulated
    }

    /// Number of entities spawned.
    #[must_use]
    pub const fn entities_spawned(&self) -> u32 {
        self.entities_spawned
    }

    /// Number of waits handed to idle entities.
    #[must_use]
    pub const fn waits_assigned(&self) -> u64 {
        self.waits_assigned
    }

    /// Number of moves handed to idle entities.
    #[must_use]
    pub const fn moves_assigned(&self) -> u64 {
        self.moves_assigned
    }

    /// Number of single-cell moves that arrived.
    #[must_use]
    pub const fn moves_completed(&self) -> u64 {
        self.moves_completed
    }

    /// Number of moves that lost their reservation.
    #[must_use]
    pub const fn moves_abandoned(&self) -> u64 {
        self.moves_abandoned
    }

    /// Number of successful path searches.
    #[must_use]
    pub const fn paths_planned(&self) -> u64 {
        self.paths_planned
    }

    /// Number of path searches that found no route.
    #[must_use]
    pub const fn path_failures(&self) -> u64 {
        self.path_failures
    }

    /// Number of steps rejected because the next cell was blocked.
    #[must_use]
    pub const fn blocked_steps(&self) -> u64 {
        self.blocked_steps
    }

    /// Mean step count of planned paths, if any were planned.
    #[must_use]
    pub fn average_path_length(&self) -> Option<f64> {
        (self.paths_planned > 0).then(|| self.planned_steps as f64 / self.paths_planned as f64)
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ticks: {} ({:.2}s simulated)",
            self.ticks,
            self.simulated.as_secs_f64()
        )?;
        writeln!(f, "entities: {}", self.entities_spawned)?;
        writeln!(
            f,
            "moves: {} assigned, {} completed, {} abandoned",
            self.moves_assigned, self.moves_completed, self.moves_abandoned
        )?;
        writeln!(f, "waits: {}", self.waits_assigned)?;
        match self.average_path_length() {
            Some(average) => writeln!(
                f,
                "paths: {} planned (avg {average:.1} steps), {} not found",
                self.paths_planned, self.path_failures
            )?,
            None => writeln!(f, "paths: none planned, {} not found", self.path_failures)?,
        }
        write!(f, "blocked steps: {}", self.blocked_steps)
    }
}

/// Pure analytics system accumulating statistics from the event stream.
#[derive(Debug, Default)]
pub struct Analytics {
    stats: SimulationStats,
}

impl Analytics {
    /// Creates a new analytics system with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Folds a batch of world events into the running statistics.
    pub fn handle(&mut self, events: &[Event]) {
        let stats = &mut self.stats;
        for event in events {
            match event {
                Event::TimeAdvanced { dt, .. } => {
                    stats.ticks = stats.ticks.saturating_add(1);
                    stats.simulated = stats.simulated.saturating_add(*dt);
                }
                Event::EntitySpawned { .. } => {
                    stats.entities_spawned = stats.entities_spawned.saturating_add(1);
                }
                Event::ActionAssigned { action, .. } => match action {
                    ActionKind::Wait => stats.waits_assigned = stats.waits_assigned.saturating_add(1),
                    ActionKind::Move => stats.moves_assigned = stats.moves_assigned.saturating_add(1),
                },
                Event::PathPlanned { steps, .. } => {
                    stats.paths_planned = stats.paths_planned.saturating_add(1);
                    stats.planned_steps = stats.planned_steps.saturating_add(u64::from(*steps));
                }
                Event::PathNotFound { .. } => {
                    stats.path_failures = stats.path_failures.saturating_add(1);
                }
                Event::StepBlocked { .. } => {
                    stats.blocked_steps = stats.blocked_steps.saturating_add(1);
                }
                Event::EntityAdvanced { .. } => {
                    stats.moves_completed = stats.moves_completed.saturating_add(1);
                }
                Event::MoveAbandoned { .. } => {
                    stats.moves_abandoned = stats.moves_abandoned.saturating_add(1);
                }
            }
        }
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        self.stats = SimulationStats::default();
    }
}
