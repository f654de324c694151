//! A* search over the occupancy grid.
//!
//! The search uses the Manhattan heuristic with a uniform step cost of one and
//! expands the four orthogonal neighbors of a node in the fixed order
//! `+x, -x, +y, -y`. The open set is ordered by `f = g + h`; equal `f` values
//! are resolved in favour of the entry inserted first, so the returned route
//! among several equally short ones is stable across runs.
//!
//! Solid occupants are skipped during expansion, but the goal itself is
//! accepted as soon as it becomes adjacent to an expanded node regardless of
//! who stands on it. Callers re-check each step before committing to it.
//!
//! There is no cap on explored nodes: a failed search on a `W x H` grid closes
//! up to `W * H` cells. That is fine for grids tens of cells across and is the
//! first thing to revisit for larger maps.

use std::{cmp::Reverse, collections::BinaryHeap, collections::VecDeque};

use tilewalk_core::{CellCoord, Direction};

use crate::grid::Grid;

const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Down,
    Direction::Up,
];

/// Ordered sequence of cells produced by the pathfinder.
///
/// A fresh path starts at the search origin and ends at the goal. Consumers
/// pop cells from the front as they walk it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: VecDeque<CellCoord>,
}

impl Path {
    /// Creates a path from cells ordered front to back.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = CellCoord>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// First remaining cell.
    #[must_use]
    pub fn front(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Last cell, which is the goal of the search.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.back().copied()
    }

    /// Removes and returns the first remaining cell.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Number of remaining cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cells remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of single-cell moves between the first and last cell.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Drops every remaining cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Iterates over the remaining cells front to back.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    cell: CellCoord,
    g: u32,
    h: u32,
    parent: Option<usize>,
}

impl Node {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    sequence: u64,
    node: usize,
}

/// Reusable A* search state.
///
/// Nodes exist only for the duration of one [`Pathfinder::find_path`] call;
/// the buffers backing them are kept between calls to avoid reallocating.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<Node>,
    open: BinaryHeap<Reverse<OpenEntry>>,
    open_node: Vec<Option<usize>>,
    closed: Vec<bool>,
    sequence: u64,
    last_expansions: usize,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes closed by the most recent search.
    #[must_use]
    pub fn last_expansions(&self) -> usize {
        self.last_expansions
    }

    /// Searches for the shortest route from `start` to `goal`.
    ///
    /// Returns `None` when no route exists, when either cell lies outside the
    /// grid, or when `start == goal`, since a path needs at least one step.
    pub fn find_path(&mut self, grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<Path> {
        self.last_expansions = 0;
        if start == goal || !grid.in_bounds(start) || !grid.in_bounds(goal) {
            return None;
        }

        self.reset(grid.cell_count());
        let start_index = grid.index(start)?;
        let root = self.push_node(Node {
            cell: start,
            g: 0,
            h: start.manhattan_distance(goal),
            parent: None,
        });
        self.open_node[start_index] = Some(root);

        while let Some(Reverse(entry)) = self.open.pop() {
            let current = self.nodes[entry.node];
            let Some(current_index) = grid.index(current.cell) else {
                continue;
            };
            if self.closed[current_index] || self.open_node[current_index] != Some(entry.node) {
                continue;
            }
            self.open_node[current_index] = None;
            self.closed[current_index] = true;
            self.last_expansions += 1;

            for direction in NEIGHBOR_ORDER {
                let Some(neighbor) = current.cell.step(direction) else {
                    continue;
                };
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                if neighbor == goal {
                    let path = self.reconstruct(entry.node, goal);
                    tracing::trace!(
                        expansions = self.last_expansions,
                        steps = path.step_count(),
                        "path found"
                    );
                    return Some(path);
                }

                if self.closed[neighbor_index] || grid.is_blocked_index(neighbor_index) {
                    continue;
                }

                let tentative = current.g + 1;
                let improves = match self.open_node[neighbor_index] {
                    None => true,
                    Some(existing) => tentative < self.nodes[existing].g,
                };
                if improves {
                    let node = self.push_node(Node {
                        cell: neighbor,
                        g: tentative,
                        h: neighbor.manhattan_distance(goal),
                        parent: Some(entry.node),
                    });
                    self.open_node[neighbor_index] = Some(node);
                }
            }
        }

        tracing::trace!(expansions = self.last_expansions, "open set exhausted");
        None
    }

    fn reset(&mut self, cell_count: usize) {
        self.nodes.clear();
        self.open.clear();
        self.open_node.clear();
        self.open_node.resize(cell_count, None);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.sequence = 0;
    }

    fn push_node(&mut self, node: Node) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.open.push(Reverse(OpenEntry {
            f: node.f(),
            sequence: self.sequence,
            node: index,
        }));
        self.sequence += 1;
        index
    }

    fn reconstruct(&self, last: usize, goal: CellCoord) -> Path {
        let mut cells = VecDeque::new();
        cells.push_front(goal);
        let mut cursor = Some(last);
        while let Some(index) = cursor {
            let node = self.nodes[index];
            cells.push_front(node.cell);
            cursor = node.parent;
        }
        Path { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupant;
    use tilewalk_core::{CollisionKind, EntityId};

    fn block(grid: &mut Grid, cell: CellCoord, id: u32) {
        grid.set_occupant(
            cell,
            Some(Occupant::new(EntityId::new(id), CollisionKind::Solid)),
        )
        .expect("cell in bounds");
    }

    fn assert_walkable(path: &Path, start: CellCoord, goal: CellCoord) {
        let cells: Vec<_> = path.iter().collect();
        assert_eq!(cells.first(), Some(&start));
        assert_eq!(cells.last(), Some(&goal));
        for pair in cells.windows(2) {
            assert_eq!(
                pair[0].manhattan_distance(pair[1]),
                1,
                "cells {:?} and {:?} are not adjacent",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn three_by_three_corner_route_is_stable() {
        let grid = Grid::new(3, 3);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder
            .find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2))
            .expect("open grid has a route");

        let cells: Vec<_> = path.iter().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(2, 1),
                CellCoord::new(2, 2),
            ]
        );
        assert_eq!(path.step_count(), 4);
    }

    #[test]
    fn open_grid_paths_match_manhattan_distance() {
        let grid = Grid::new(5, 4);
        let mut pathfinder = Pathfinder::new();
        let cells: Vec<_> = grid.tiles().iter().map(|tile| tile.cell()).collect();

        for &start in &cells {
            for &goal in &cells {
                if start == goal {
                    continue;
                }
                let path = pathfinder
                    .find_path(&grid, start, goal)
                    .expect("open grid has a route");
                assert_eq!(
                    path.step_count(),
                    usize::try_from(start.manhattan_distance(goal)).expect("fits"),
                    "non-optimal path from {start:?} to {goal:?}"
                );
                assert_walkable(&path, start, goal);
            }
        }
    }

    #[test]
    fn routes_around_solid_occupants() {
        let mut grid = Grid::new(3, 3);
        block(&mut grid, CellCoord::new(1, 0), 1);
        block(&mut grid, CellCoord::new(1, 1), 2);
        let mut pathfinder = Pathfinder::new();

        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(2, 0);
        let path = pathfinder
            .find_path(&grid, start, goal)
            .expect("detour through the bottom row");

        assert_walkable(&path, start, goal);
        assert_eq!(path.step_count(), 6);
        assert!(path.iter().all(|cell| cell.column() != 1 || cell.row() == 2));
    }

    #[test]
    fn passable_occupants_do_not_block() {
        let mut grid = Grid::new(3, 1);
        grid.set_occupant(
            CellCoord::new(1, 0),
            Some(Occupant::new(EntityId::new(9), CollisionKind::Passable)),
        )
        .expect("cell in bounds");
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder
            .find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0))
            .expect("passable occupant is walked through");
        assert_eq!(path.step_count(), 2);
    }

    #[test]
    fn enclosed_start_reports_not_found_within_bound() {
        let mut grid = Grid::new(5, 5);
        let start = CellCoord::new(2, 2);
        block(&mut grid, CellCoord::new(1, 2), 1);
        block(&mut grid, CellCoord::new(3, 2), 2);
        block(&mut grid, CellCoord::new(2, 1), 3);
        block(&mut grid, CellCoord::new(2, 3), 4);
        let mut pathfinder = Pathfinder::new();

        let outcome = pathfinder.find_path(&grid, start, CellCoord::new(4, 4));

        assert!(outcome.is_none());
        assert!(pathfinder.last_expansions() <= grid.cell_count());
        assert_eq!(pathfinder.last_expansions(), 1);
    }

    #[test]
    fn walled_off_goal_exhausts_reachable_region() {
        let mut grid = Grid::new(4, 4);
        for row in 0..4 {
            block(&mut grid, CellCoord::new(2, row), row + 1);
        }
        let mut pathfinder = Pathfinder::new();

        let outcome = pathfinder.find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3));

        assert!(outcome.is_none());
        assert_eq!(pathfinder.last_expansions(), 8);
    }

    #[test]
    fn occupied_goal_is_still_reachable() {
        let mut grid = Grid::new(5, 5);
        let goal = CellCoord::new(3, 2);
        block(&mut grid, goal, 1);
        let mut pathfinder = Pathfinder::new();

        let start = CellCoord::new(2, 2);
        let path = pathfinder
            .find_path(&grid, start, goal)
            .expect("goal occupant does not hide the goal");

        assert_eq!(path.goal(), Some(goal));
        assert_eq!(path.step_count(), 1);
    }

    #[test]
    fn degenerate_requests_skip_the_search() {
        let grid = Grid::new(3, 3);
        let mut pathfinder = Pathfinder::new();
        let cell = CellCoord::new(1, 1);

        assert!(pathfinder.find_path(&grid, cell, cell).is_none());
        assert_eq!(pathfinder.last_expansions(), 0);

        assert!(pathfinder
            .find_path(&grid, cell, CellCoord::new(3, 1))
            .is_none());
        assert_eq!(pathfinder.last_expansions(), 0);
    }

    #[test]
    fn scratch_buffers_survive_grid_resizes() {
        let mut pathfinder = Pathfinder::new();
        let large = Grid::new(8, 8);
        let small = Grid::new(2, 2);

        let first = pathfinder.find_path(&large, CellCoord::new(0, 0), CellCoord::new(7, 7));
        let second = pathfinder.find_path(&small, CellCoord::new(0, 0), CellCoord::new(1, 1));

        assert_eq!(first.map(|path| path.step_count()), Some(14));
        assert_eq!(second.map(|path| path.step_count()), Some(2));
    }
}
