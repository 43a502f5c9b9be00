#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that lets every tower strike one bot in range per tick.

use etd_core::{BotId, Command, EngineConfig, Point, TowerId, MAX_BOTS};
use etd_world::{query, World};
use tracing::trace;

/// Tower combat system that queues damage commands against live bots.
///
/// Targets are chosen with a plain scan: the last live bot in store order
/// whose Chebyshev distance to the tower is below the engagement radius wins.
/// Damage queued earlier in the same pass is tracked so a bot already
/// destroyed by another tower is not targeted again.
#[derive(Debug)]
pub struct Combat {
    engagement_radius: u8,
    predicted: [u8; MAX_BOTS],
}

impl Combat {
    /// Creates a combat system with the configured engagement radius.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            engagement_radius: config.engagement_radius,
            predicted: [0; MAX_BOTS],
        }
    }

    /// Emits `Command::DamageBot` for every tower with a live bot in range.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        let towers = query::towers(world);
        if towers.is_empty() {
            return;
        }

        let bots = query::bots(world);
        for (slot, bot) in self.predicted.iter_mut().zip(bots) {
            *slot = bot.health;
        }
        let damage = query::damage_table(world);

        for (index, tower) in towers.iter().enumerate() {
            let Ok(tower_id) = u8::try_from(index) else {
                break;
            };
            let Some(target) = self.select_target(tower.position, world) else {
                continue;
            };
            let amount = damage.damage_for(tower.level);
            if amount == 0 {
                continue;
            }

            if let Some(health) = self.predicted.get_mut(target.index()) {
                *health = health.saturating_sub(amount);
            }
            trace!(tower = tower_id, bot = target.get(), amount, "tower engaged");
            out.push(Command::DamageBot {
                bot: target,
                tower: TowerId::new(tower_id),
                amount,
            });
        }
    }

    fn select_target(&self, tower: Point, world: &World) -> Option<BotId> {
        let mut selected = None;
        for (index, bot) in query::bots(world).iter().enumerate() {
            let alive = self.predicted.get(index).is_some_and(|health| *health > 0);
            if alive && tower.chebyshev_distance(bot.position) < self.engagement_radius {
                selected = u8::try_from(index).ok().map(BotId::new);
            }
        }
        selected
    }
}
