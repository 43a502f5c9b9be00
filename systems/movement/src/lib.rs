#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Three-tier movement policy that advances a single bot toward the base.
//!
//! Every evaluation starts with a greedy axis-aligned step. When that fails
//! and the bot still has search budget, the wave pathfinder proposes a step;
//! once the budget is exhausted the bot either relocates to a random free
//! tile or holds position near the base. No mode is persisted between ticks;
//! the bot's flood-attempt counter is the only memory.

use etd_core::{BotId, Command, Direction, EngineConfig, MapSize, Point};
use etd_system_pathfinding::{WavePathfinder, DEFAULT_NODE_BUDGET};
use etd_world::{query, StepVerdict, TileLookup, World};
use rand::Rng;
use tracing::{debug, trace};

/// Pathfinder pool sized for the default search budget.
pub type DefaultMovementPolicy = MovementPolicy<DEFAULT_NODE_BUDGET>;

/// How a bot's turn was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// Greedy step onto a free tile.
    Direct,
    /// Step proposed by the wave pathfinder.
    Searched,
    /// The chosen step lands on the base.
    ReachedBase,
    /// A stuck bot passed congested traffic without moving.
    Yielded,
    /// Greedy and searched steps both failed; the counter grows.
    SearchFailed,
    /// Stuck bot moved to a random free tile.
    Relocated,
    /// Stuck bot drew no free tile this turn.
    RelocationExhausted,
    /// Stuck bot already within engagement range of the base.
    Holding,
    /// The slot holds no live bot.
    Inert,
}

/// Per-bot movement decision maker.
#[derive(Debug)]
pub struct MovementPolicy<const N: usize> {
    pathfinder: WavePathfinder<N>,
    max_flood_attempts: u8,
    engagement_radius: u8,
    relocation_draws: u16,
}

impl<const N: usize> MovementPolicy<N> {
    /// Creates a policy using the configured thresholds and search budget.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pathfinder: WavePathfinder::with_budget(config.node_budget),
            max_flood_attempts: config.max_flood_attempts,
            engagement_radius: config.engagement_radius,
            relocation_draws: config.relocation_draws,
        }
    }

    /// Decides the bot's move for this tick and queues the commands that
    /// realise it.
    pub fn plan<R: Rng>(
        &mut self,
        world: &World,
        bot: BotId,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> MoveOutcome {
        let Some(record) = query::bot(world, bot).filter(|record| record.is_live()) else {
            return MoveOutcome::Inert;
        };
        let position = record.position;
        let stuck = record.flood_attempts >= self.max_flood_attempts;

        if let Some(outcome) = try_direct(world, bot, position, stuck, out) {
            return outcome;
        }

        if !stuck {
            return self.try_search(world, bot, position, out);
        }

        self.recover(world, bot, position, rng, out)
    }

    fn try_search(
        &mut self,
        world: &World,
        bot: BotId,
        position: Point,
        out: &mut Vec<Command>,
    ) -> MoveOutcome {
        let base = query::base(world);
        let bounds = query::tile_grid(world).size();
        let step = self.pathfinder.find_step(position, base, bounds, |point| {
            query::is_searchable(world, point)
        });

        match step.map(|to| (to, query::step_verdict(world, bot, to, false))) {
            Some((to, StepVerdict::Clear)) => {
                out.push(Command::MoveBot { bot, to });
                MoveOutcome::Searched
            }
            Some((_, StepVerdict::ReachesBase)) => {
                out.push(Command::ReachBase { bot });
                MoveOutcome::ReachedBase
            }
            _ => {
                trace!(bot = bot.get(), ?position, "no usable route this tick");
                out.push(Command::RecordSearchFailure { bot });
                MoveOutcome::SearchFailed
            }
        }
    }

    fn recover<R: Rng>(
        &self,
        world: &World,
        bot: BotId,
        position: Point,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> MoveOutcome {
        if position.chebyshev_distance(query::base(world)) < self.engagement_radius {
            return MoveOutcome::Holding;
        }

        let bounds = query::tile_grid(world).size();
        for _ in 0..self.relocation_draws {
            let candidate = random_point(bounds, rng);
            if is_free_tile(world, candidate) {
                out.push(Command::RelocateBot { bot, to: candidate });
                return MoveOutcome::Relocated;
            }
        }

        debug!(
            bot = bot.get(),
            draws = self.relocation_draws,
            "relocation found no free tile"
        );
        MoveOutcome::RelocationExhausted
    }
}

fn try_direct(
    world: &World,
    bot: BotId,
    position: Point,
    stuck: bool,
    out: &mut Vec<Command>,
) -> Option<MoveOutcome> {
    let bounds = query::tile_grid(world).size();
    for direction in greedy_directions(position, query::base(world)) {
        let Some(to) = position.step(direction, bounds) else {
            continue;
        };
        match query::step_verdict(world, bot, to, stuck) {
            StepVerdict::Clear => {
                out.push(Command::MoveBot { bot, to });
                return Some(MoveOutcome::Direct);
            }
            StepVerdict::ReachesBase => {
                out.push(Command::ReachBase { bot });
                return Some(MoveOutcome::ReachedBase);
            }
            StepVerdict::Override => return Some(MoveOutcome::Yielded),
            StepVerdict::Blocked | StepVerdict::Congested => {}
        }
    }
    None
}

/// Greedy step order: the dominant axis first, then the minor axis.
///
/// Ties between the axes resolve to the vertical branch. A zero delta on the
/// minor axis falls back to South or East, a sideways step around the
/// obstacle.
fn greedy_directions(position: Point, base: Point) -> [Direction; 2] {
    let delta_x = i16::from(position.x()) - i16::from(base.x());
    let delta_y = i16::from(position.y()) - i16::from(base.y());
    let horizontal = if delta_x > 0 {
        Direction::West
    } else {
        Direction::East
    };
    let vertical = if delta_y > 0 {
        Direction::North
    } else {
        Direction::South
    };

    if delta_x.abs() > delta_y.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    }
}

fn random_point<R: Rng>(bounds: MapSize, rng: &mut R) -> Point {
    Point::new(
        rng.gen_range(0..bounds.width()),
        rng.gen_range(0..bounds.height()),
    )
}

fn is_free_tile(world: &World, point: Point) -> bool {
    point != query::base(world)
        && query::tile_grid(world).is_passable(point)
        && query::tower_at(world, point).is_none()
        && query::bot_at(world, point).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_ties_take_the_vertical_branch() {
        let order = greedy_directions(Point::new(10, 10), Point::new(0, 0));
        assert_eq!(order, [Direction::North, Direction::West]);
    }

    #[test]
    fn dominant_horizontal_delta_goes_first() {
        let order = greedy_directions(Point::new(2, 5), Point::new(9, 4));
        assert_eq!(order, [Direction::East, Direction::North]);
    }

    #[test]
    fn aligned_bot_sidesteps_south_or_east() {
        let order = greedy_directions(Point::new(3, 8), Point::new(3, 2));
        assert_eq!(order, [Direction::North, Direction::East]);
    }
}
