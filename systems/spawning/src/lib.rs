#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn admission at entry points and level progression.

use etd_core::Command;
use etd_world::{query, World};
use tracing::debug;

/// Pure system that admits bots at free entry points while capacity remains.
#[derive(Debug, Default)]
pub struct Spawning;

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Queues spawn commands for this tick.
    ///
    /// Entry points are visited in map order; an entry point holding a live
    /// bot is skipped. Once every slot of the store is used and every bot in
    /// it is dead, the level advances instead.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        if query::wave_exhausted(world) {
            debug!(
                level = query::level_index(world),
                "wave cleared, advancing level"
            );
            out.push(Command::AdvanceLevel);
            return;
        }

        let mut remaining = query::bot_capacity(world).saturating_sub(query::bots(world).len());
        for &entry in query::entry_points(world) {
            if remaining == 0 {
                break;
            }
            if query::bot_at(world, entry).is_some() {
                continue;
            }
            out.push(Command::SpawnBot { at: entry });
            remaining -= 1;
        }
    }
}
