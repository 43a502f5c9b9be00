#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver that sequences the combat, movement and spawn passes against
//! the authoritative world.
//!
//! A [`Simulation`] is the single owner of all mutable game state. Ticks are
//! non-reentrant by construction: [`Simulation::tick`] borrows the simulation
//! mutably and runs to completion, so adapters can only feed input or render
//! between ticks.

mod clock;

use etd_core::{BotId, Command, EngineConfig, Event, InputEvent, MovementSchedule, Point};
use etd_system_builder::Builder;
use etd_system_combat::Combat;
use etd_system_movement::{DefaultMovementPolicy, MoveOutcome};
use etd_system_spawning::Spawning;
use etd_world::{self as world, query, MapLayout, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use clock::TickClock;

/// Game session: world state plus the systems that advance it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    combat: Combat,
    movement: DefaultMovementPolicy,
    spawning: Spawning,
    builder: Builder,
    schedule: MovementSchedule,
    next_bot: usize,
    rng: ChaCha8Rng,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates a session on `layout` with the supplied configuration.
    #[must_use]
    pub fn new(layout: MapLayout, config: &EngineConfig) -> Self {
        let world = World::new(layout, config);
        info!(
            banner = query::welcome_banner(&world),
            seed = config.rng_seed,
            schedule = ?config.schedule,
            "simulation ready"
        );
        Self {
            world,
            combat: Combat::new(config),
            movement: DefaultMovementPolicy::new(config),
            spawning: Spawning::new(),
            builder: Builder::new(),
            schedule: config.schedule,
            next_bot: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            commands: Vec::new(),
        }
    }

    /// Read-only access to the world for rendering and inspection.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances the simulation by one step.
    ///
    /// Combat runs against start-of-tick positions, then bots move, then new
    /// bots are admitted. Every resulting event, render signals included, is
    /// appended to `out`.
    pub fn tick(&mut self, out: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::Tick, out);

        self.combat.handle(&self.world, &mut self.commands);
        self.flush(out);

        match self.schedule {
            MovementSchedule::RoundRobin => self.move_next_bot(out),
            MovementSchedule::FullPass => {
                for index in 0..query::bots(&self.world).len() {
                    let _ = self.move_bot(index, out);
                }
            }
        }

        self.spawning.handle(&self.world, &mut self.commands);
        self.flush(out);
        trace!(tick = query::tick_index(&self.world), "tick complete");
    }

    /// Applies an intent command issued between ticks.
    pub fn submit(&mut self, command: Command, out: &mut Vec<Event>) {
        world::apply(&mut self.world, command, out);
    }

    /// Requests a tower at `at`.
    pub fn request_build_tower(&mut self, at: Point, out: &mut Vec<Event>) {
        self.submit(Command::BuildTower { at }, out);
    }

    /// Requests an upgrade of the tower at `at`.
    pub fn request_upgrade_tower(&mut self, at: Point, out: &mut Vec<Event>) {
        self.submit(Command::UpgradeTower { at }, out);
    }

    /// Moves the build cursor to `to`.
    pub fn request_set_cursor(&mut self, to: Point, out: &mut Vec<Event>) {
        self.submit(Command::SetCursor { to }, out);
    }

    /// Translates decoded player input into intent commands and applies them.
    pub fn handle_input(&mut self, input: InputEvent, out: &mut Vec<Event>) {
        self.builder
            .handle(input, query::viewport(&self.world), &mut self.commands);
        self.flush(out);
    }

    fn move_next_bot(&mut self, out: &mut Vec<Event>) {
        let count = query::bots(&self.world).len();
        if count == 0 {
            self.next_bot = 0;
            return;
        }

        let start = self.next_bot % count;
        for offset in 0..count {
            let index = (start + offset) % count;
            if self.move_bot(index, out) != MoveOutcome::Inert {
                self.next_bot = (index + 1) % count;
                return;
            }
        }
    }

    fn move_bot(&mut self, index: usize, out: &mut Vec<Event>) -> MoveOutcome {
        let Ok(slot) = u8::try_from(index) else {
            return MoveOutcome::Inert;
        };
        let bot = BotId::new(slot);
        let outcome = self
            .movement
            .plan(&self.world, bot, &mut self.rng, &mut self.commands);
        if matches!(
            outcome,
            MoveOutcome::Relocated | MoveOutcome::RelocationExhausted
        ) {
            debug!(bot = slot, ?outcome, "stuck recovery");
        }
        self.flush(out);
        outcome
    }

    fn flush(&mut self, out: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out);
        }
    }
}
