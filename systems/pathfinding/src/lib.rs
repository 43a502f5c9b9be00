#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Memory-bounded breadth-first "wave" search that yields the first step of a
//! shortest terrain-respecting route toward a single goal.
//!
//! The search never allocates: visited nodes live in a fixed-capacity pool
//! that is cleared at the start of every invocation. Running out of pool
//! space before the goal is discovered is a normal outcome and reported as
//! `None`.

use etd_core::{BoundedBuf, MapSize, Point};
use tracing::trace;

/// Default pool size, large enough for the shipped map's typical detours.
pub const DEFAULT_NODE_BUDGET: usize = 120;

/// Scratch record of one discovered position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisitedNode {
    /// Discovered tile.
    pub position: Point,
    /// Hop count from the search origin.
    pub weight: u16,
}

/// Bounded wave pathfinder whose pool holds at most `N` nodes.
#[derive(Clone, Debug)]
pub struct WavePathfinder<const N: usize> {
    pool: BoundedBuf<VisitedNode, N>,
    budget: usize,
}

impl<const N: usize> WavePathfinder<N> {
    /// Creates a pathfinder that may use the whole pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(N)
    }

    /// Creates a pathfinder restricted to `budget` nodes, clamped to `N`.
    #[must_use]
    pub fn with_budget(budget: usize) -> Self {
        Self {
            pool: BoundedBuf::new(),
            budget: budget.min(N),
        }
    }

    /// Number of nodes a single search may discover.
    #[must_use]
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Nodes discovered by the most recent search, in insertion order.
    #[must_use]
    pub fn visited(&self) -> &[VisitedNode] {
        self.pool.as_slice()
    }

    /// Searches from `origin` toward `goal` and returns the first step.
    ///
    /// `is_passable` decides whether a tile may be discovered; the goal is
    /// always accepted when it lies inside `bounds`. Returns `None` when the
    /// origin already is the goal, when no route exists, or when the pool
    /// fills before the goal is reached.
    pub fn find_step<F>(
        &mut self,
        origin: Point,
        goal: Point,
        bounds: MapSize,
        is_passable: F,
    ) -> Option<Point>
    where
        F: Fn(Point) -> bool,
    {
        self.pool.clear();
        if origin == goal || self.budget == 0 {
            return None;
        }
        self.push(VisitedNode {
            position: origin,
            weight: 0,
        })?;

        let goal_weight = self.expand(goal, bounds, &is_passable)?;
        let step = self.backtrack(goal, goal_weight, bounds);
        trace!(
            ?origin,
            ?goal,
            goal_weight,
            visited = self.pool.len(),
            ?step,
            "wave search finished"
        );
        step
    }

    fn expand<F>(&mut self, goal: Point, bounds: MapSize, is_passable: &F) -> Option<u16>
    where
        F: Fn(Point) -> bool,
    {
        let mut cursor = 0;
        while let Some(node) = self.pool.get(cursor).copied() {
            cursor += 1;
            let weight = node.weight.checked_add(1)?;
            for neighbor in node.position.neighbors(bounds) {
                if self.contains(neighbor) {
                    continue;
                }
                if neighbor != goal && !is_passable(neighbor) {
                    continue;
                }
                if self.push(VisitedNode {
                    position: neighbor,
                    weight,
                })
                .is_none()
                {
                    trace!(budget = self.budget, "wave search exhausted its node pool");
                    return None;
                }
                if neighbor == goal {
                    return Some(weight);
                }
            }
        }
        None
    }

    fn backtrack(&self, goal: Point, goal_weight: u16, bounds: MapSize) -> Option<Point> {
        let mut current = goal;
        let mut weight = goal_weight;
        while weight > 1 {
            let previous = weight - 1;
            current = current
                .neighbors(bounds)
                .find(|neighbor| self.weight_of(*neighbor) == Some(previous))?;
            weight = previous;
        }
        Some(current)
    }

    fn push(&mut self, node: VisitedNode) -> Option<()> {
        if self.pool.len() >= self.budget {
            return None;
        }
        self.pool.try_push(node).map(|_| ())
    }

    fn contains(&self, point: Point) -> bool {
        self.weight_of(point).is_some()
    }

    fn weight_of(&self, point: Point) -> Option<u16> {
        self.pool
            .iter()
            .find(|node| node.position == point)
            .map(|node| node.weight)
    }
}

impl<const N: usize> Default for WavePathfinder<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(_: Point) -> bool {
        true
    }

    #[test]
    fn adjacent_goal_is_the_step() {
        let mut pathfinder = WavePathfinder::<16>::new();
        let step = pathfinder.find_step(
            Point::new(3, 3),
            Point::new(3, 2),
            MapSize::new(8, 8),
            open,
        );
        assert_eq!(step, Some(Point::new(3, 2)));
    }

    #[test]
    fn origin_on_goal_yields_nothing() {
        let mut pathfinder = WavePathfinder::<16>::new();
        let step = pathfinder.find_step(
            Point::new(1, 1),
            Point::new(1, 1),
            MapSize::new(4, 4),
            open,
        );
        assert_eq!(step, None);
        assert!(pathfinder.visited().is_empty());
    }

    #[test]
    fn single_node_budget_only_holds_the_origin() {
        let mut pathfinder = WavePathfinder::<16>::with_budget(1);
        let step = pathfinder.find_step(
            Point::new(3, 3),
            Point::new(3, 2),
            MapSize::new(8, 8),
            open,
        );
        assert_eq!(step, None);
        assert_eq!(
            pathfinder.visited(),
            &[VisitedNode {
                position: Point::new(3, 3),
                weight: 0,
            }]
        );
    }

    #[test]
    fn budget_is_clamped_to_pool_capacity() {
        let pathfinder = WavePathfinder::<8>::with_budget(500);
        assert_eq!(pathfinder.budget(), 8);
    }

    #[test]
    fn backtracking_walks_north_first_from_the_goal() {
        let mut pathfinder = WavePathfinder::<64>::new();
        let step = pathfinder.find_step(
            Point::new(0, 3),
            Point::new(3, 0),
            MapSize::new(4, 4),
            open,
        );
        assert_eq!(step, Some(Point::new(1, 3)));
    }

    #[test]
    fn goal_is_accepted_even_when_marked_impassable() {
        let goal = Point::new(2, 0);
        let mut pathfinder = WavePathfinder::<16>::new();
        let step = pathfinder.find_step(Point::new(0, 0), goal, MapSize::new(3, 1), |point| {
            point != goal
        });
        assert_eq!(step, Some(Point::new(1, 0)));
    }
}
