#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the embedded tower defence engine.
//!
//! The world owns the entity store (bounded bot and tower buffers), the tile
//! lookup, the economy and the viewport. All mutation flows through [`apply`],
//! which validates the command, updates state and reports the outcome as
//! [`Event`] values, including the render signals the terminal adapter
//! consumes.

mod map;
mod viewport;

use etd_core::{
    Bot, BotId, BoundedBuf, Command, DamageTable, EngineConfig, Event, LevelSpec, PlacementError,
    Point, RenderSignal, Tower, TowerId, UpgradeError, MAX_BOTS, MAX_ENTRY_POINTS, MAX_TOWERS,
    WELCOME_BANNER,
};
use tracing::{debug, trace};

pub use map::{MapError, MapLayout, TileGrid, TileLookup};
pub use viewport::{Viewport, BORDER_WIDTH};

/// Represents the authoritative game state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: TileGrid,
    base: Point,
    entry_points: BoundedBuf<Point, MAX_ENTRY_POINTS>,
    bots: BoundedBuf<Bot, MAX_BOTS>,
    bot_capacity: usize,
    towers: BoundedBuf<Tower, MAX_TOWERS>,
    tower_capacity: usize,
    damage: DamageTable,
    levels: Vec<LevelSpec>,
    level: usize,
    gold: u32,
    build_cost: u32,
    upgrade_cost: u32,
    viewport: Viewport,
    tick_index: u64,
}

impl World {
    /// Creates a world on the provided map using the supplied configuration.
    #[must_use]
    pub fn new(layout: MapLayout, config: &EngineConfig) -> Self {
        let (grid, base, entry_points) = layout.into_parts();
        Self {
            banner: WELCOME_BANNER,
            grid,
            base,
            entry_points,
            bots: BoundedBuf::new(),
            bot_capacity: config.effective_bot_capacity(),
            towers: BoundedBuf::new(),
            tower_capacity: config.effective_tower_capacity(),
            damage: config.tower_damage.clone(),
            levels: config.levels.clone(),
            level: 0,
            gold: config.initial_gold,
            build_cost: config.tower_build_cost,
            upgrade_cost: config.tower_upgrade_cost,
            viewport: Viewport::new(),
            tick_index: 0,
        }
    }

    fn bot_mut(&mut self, bot: BotId) -> Option<&mut Bot> {
        self.bots.get_mut(bot.index())
    }

    fn live_bot_mut(&mut self, bot: BotId) -> Option<&mut Bot> {
        self.bot_mut(bot).filter(|record| record.is_live())
    }

    fn active_level(&self) -> Option<&LevelSpec> {
        self.levels.get(self.level)
    }

    fn is_entry_point(&self, point: Point) -> bool {
        self.entry_points.iter().any(|entry| *entry == point)
    }

    fn is_vacant_ground(&self, point: Point) -> bool {
        self.grid.is_passable(point)
            && point != self.base
            && query::tower_at(self, point).is_none()
            && query::bot_at(self, point).is_none()
    }

    fn spawn_bot(&mut self, at: Point, out_events: &mut Vec<Event>) {
        if self.bots.len() >= self.bot_capacity {
            trace!(?at, "bot store at capacity, spawn dropped");
            return;
        }
        if !self.is_vacant_ground(at) {
            trace!(?at, "spawn tile occupied, spawn dropped");
            return;
        }

        let health = self.active_level().map_or(1, |level| level.health_points.max(1));
        let Some(index) = self.bots.try_push(Bot::spawned(at, health)) else {
            return;
        };
        let Ok(slot) = u8::try_from(index) else {
            return;
        };

        out_events.push(Event::BotSpawned {
            bot: BotId::new(slot),
            at,
        });
        out_events.push(Event::Redraw(RenderSignal::entity(at)));
    }

    fn move_bot(&mut self, bot: BotId, to: Point, out_events: &mut Vec<Event>) {
        let Some(from) = self.live_bot_mut(bot).map(|record| record.position) else {
            return;
        };

        if !from.is_adjacent(to) || !self.is_vacant_ground(to) {
            out_events.push(Event::BotMoveRejected { bot, to });
            return;
        }

        if let Some(record) = self.bot_mut(bot) {
            record.position = to;
            record.flood_attempts = 0;
        }
        out_events.push(Event::Redraw(RenderSignal::tile(from)));
        out_events.push(Event::Redraw(RenderSignal::entity(to)));
        out_events.push(Event::BotMoved { bot, from, to });
    }

    fn relocate_bot(&mut self, bot: BotId, to: Point, out_events: &mut Vec<Event>) {
        let Some(from) = self.live_bot_mut(bot).map(|record| record.position) else {
            return;
        };

        if !self.is_vacant_ground(to) {
            out_events.push(Event::BotMoveRejected { bot, to });
            return;
        }

        if let Some(record) = self.bot_mut(bot) {
            record.position = to;
            record.flood_attempts = 0;
        }
        debug!(bot = bot.get(), ?from, ?to, "stuck bot relocated");
        out_events.push(Event::Redraw(RenderSignal::tile(from)));
        out_events.push(Event::Redraw(RenderSignal::entity(to)));
        out_events.push(Event::BotRelocated { bot, from, to });
    }

    fn damage_bot(&mut self, bot: BotId, tower: TowerId, amount: u8, out_events: &mut Vec<Event>) {
        let Some(record) = self.live_bot_mut(bot) else {
            return;
        };

        record.health = record.health.saturating_sub(amount);
        let remaining = record.health;
        let position = record.position;
        out_events.push(Event::BotDamaged {
            bot,
            tower,
            remaining,
        });

        if remaining == 0 {
            out_events.push(Event::Redraw(RenderSignal::tile(position)));
            out_events.push(Event::BotDestroyed { bot, at: position });

            let reward = self.active_level().map_or(0, |level| level.kill_reward);
            if reward > 0 {
                self.gold = self.gold.saturating_add(u32::from(reward));
                out_events.push(Event::GoldChanged { gold: self.gold });
            }
        }
    }

    fn advance_level(&mut self, out_events: &mut Vec<Event>) {
        for bot in self.bots.iter().filter(|bot| bot.is_live()) {
            out_events.push(Event::Redraw(RenderSignal::tile(bot.position)));
        }
        self.bots.clear();

        let last = self.levels.len().saturating_sub(1);
        self.level = (self.level + 1).min(last);
        debug!(level = self.level, "level advanced");
        out_events.push(Event::LevelAdvanced { level: self.level });
    }

    fn build_tower(&mut self, at: Point, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.check_placement(at) {
            trace!(?at, ?reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { at, reason });
            return;
        }

        let Some(index) = self.towers.try_push(Tower {
            position: at,
            level: 1,
        }) else {
            out_events.push(Event::TowerPlacementRejected {
                at,
                reason: PlacementError::TowerLimit,
            });
            return;
        };
        let Ok(slot) = u8::try_from(index) else {
            return;
        };

        self.gold -= self.build_cost;
        let tower = TowerId::new(slot);
        debug!(tower = slot, ?at, gold = self.gold, "tower placed");
        out_events.push(Event::TowerPlaced { tower, at });
        out_events.push(Event::Redraw(RenderSignal::entity(at)));
        out_events.push(Event::GoldChanged { gold: self.gold });
    }

    fn check_placement(&self, at: Point) -> Result<(), PlacementError> {
        if self.towers.len() >= self.tower_capacity {
            return Err(PlacementError::TowerLimit);
        }
        if self.gold < self.build_cost {
            return Err(PlacementError::InsufficientGold);
        }
        let Some(tile) = self.grid.tile_at(at) else {
            return Err(PlacementError::OutOfBounds);
        };
        if !tile.is_passable() {
            return Err(PlacementError::Blocked);
        }
        if at == self.base {
            return Err(PlacementError::Base);
        }
        if self.is_entry_point(at) {
            return Err(PlacementError::EntryPoint);
        }
        if query::tower_at(self, at).is_some() || query::bot_at(self, at).is_some() {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    fn upgrade_tower(&mut self, at: Point, out_events: &mut Vec<Event>) {
        let Some((tower, level)) =
            query::tower_at(self, at).map(|(tower, record)| (tower, record.level))
        else {
            out_events.push(Event::TowerUpgradeRejected {
                at,
                reason: UpgradeError::NoTower,
            });
            return;
        };

        let reason = if level >= self.damage.max_level() {
            Some(UpgradeError::MaxLevel)
        } else if self.gold < self.upgrade_cost {
            Some(UpgradeError::InsufficientGold)
        } else {
            None
        };
        if let Some(reason) = reason {
            out_events.push(Event::TowerUpgradeRejected { at, reason });
            return;
        }

        let Some(record) = self.towers.get_mut(tower.index()) else {
            return;
        };
        record.level += 1;
        let level = record.level;
        self.gold -= self.upgrade_cost;
        debug!(tower = tower.get(), level, "tower upgraded");
        out_events.push(Event::TowerUpgraded { tower, level });
        out_events.push(Event::Redraw(RenderSignal::entity(at)));
        out_events.push(Event::GoldChanged { gold: self.gold });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::SpawnBot { at } => world.spawn_bot(at, out_events),
        Command::MoveBot { bot, to } => world.move_bot(bot, to, out_events),
        Command::ReachBase { bot } => {
            if let Some(record) = world.live_bot_mut(bot) {
                record.flood_attempts = 0;
                out_events.push(Event::BotReachedBase { bot });
            }
        }
        Command::RecordSearchFailure { bot } => {
            if let Some(record) = world.live_bot_mut(bot) {
                record.flood_attempts = record.flood_attempts.saturating_add(1);
                out_events.push(Event::PathSearchFailed {
                    bot,
                    attempts: record.flood_attempts,
                });
            }
        }
        Command::RelocateBot { bot, to } => world.relocate_bot(bot, to, out_events),
        Command::DamageBot { bot, tower, amount } => {
            world.damage_bot(bot, tower, amount, out_events);
        }
        Command::AdvanceLevel => world.advance_level(out_events),
        Command::BuildTower { at } => world.build_tower(at, out_events),
        Command::UpgradeTower { at } => world.upgrade_tower(at, out_events),
        Command::SetCursor { to } => {
            if world.viewport.set_cursor(to, world.grid.size()) {
                out_events.push(Event::CursorMoved { to });
            }
        }
        Command::MoveCursor { direction } => {
            if world.viewport.move_cursor(direction, world.grid.size()) {
                out_events.push(Event::CursorMoved {
                    to: world.viewport.cursor(),
                });
            }
        }
        Command::PanView { direction } => {
            if world.viewport.pan(direction, world.grid.size()) {
                out_events.push(Event::ViewPanned {
                    origin: world.viewport.origin(),
                });
            }
        }
        Command::ResizeViewport { width, height } => {
            if world.viewport.resize(width, height) {
                out_events.push(Event::ViewportResized { width, height });
            }
        }
        Command::Inspect { at } => {
            if let Some((bot, record)) = query::bot_at(world, at) {
                out_events.push(Event::BotInspected {
                    bot,
                    health: record.health,
                });
            }
        }
    }
}

/// Outcome of checking whether a bot may take a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepVerdict {
    /// Out of bounds, impassable terrain or a tower.
    Blocked,
    /// The step lands on the base; the bot arrives without occupying it.
    ReachesBase,
    /// Another live bot holds the tile.
    Congested,
    /// Another live bot holds the tile, but the mover is stuck long enough to
    /// pass it without displacing it.
    Override,
    /// The tile is free.
    Clear,
}

impl StepVerdict {
    /// Reports whether the step counts as progress.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(
            self,
            StepVerdict::ReachesBase | StepVerdict::Override | StepVerdict::Clear
        )
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use etd_core::{Bot, BotId, DamageTable, LevelSpec, Point, Tower, TowerId};

    use super::{StepVerdict, TileGrid, TileLookup, Viewport, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Terrain lookup of the active map.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Goal tile of every bot.
    #[must_use]
    pub fn base(world: &World) -> Point {
        world.base
    }

    /// Tiles where bots are admitted.
    #[must_use]
    pub fn entry_points(world: &World) -> &[Point] {
        world.entry_points.as_slice()
    }

    /// Every bot slot in use, live or dead, indexed by [`BotId`].
    #[must_use]
    pub fn bots(world: &World) -> &[Bot] {
        world.bots.as_slice()
    }

    /// Bot stored in the slot, live or dead.
    #[must_use]
    pub fn bot(world: &World, bot: BotId) -> Option<&Bot> {
        world.bots.get(bot.index())
    }

    /// First live bot standing on the point.
    #[must_use]
    pub fn bot_at(world: &World, point: Point) -> Option<(BotId, &Bot)> {
        world
            .bots
            .iter()
            .enumerate()
            .find(|(_, bot)| bot.is_live() && bot.position == point)
            .and_then(|(index, bot)| Some((BotId::new(u8::try_from(index).ok()?), bot)))
    }

    /// Every tower placed, indexed by [`TowerId`].
    #[must_use]
    pub fn towers(world: &World) -> &[Tower] {
        world.towers.as_slice()
    }

    /// Tower standing on the point.
    #[must_use]
    pub fn tower_at(world: &World, point: Point) -> Option<(TowerId, &Tower)> {
        world
            .towers
            .iter()
            .enumerate()
            .find(|(_, tower)| tower.position == point)
            .and_then(|(index, tower)| Some((TowerId::new(u8::try_from(index).ok()?), tower)))
    }

    /// Number of bot slots the store may fill.
    #[must_use]
    pub fn bot_capacity(world: &World) -> usize {
        world.bot_capacity
    }

    /// Reports whether another bot can be admitted.
    #[must_use]
    pub fn has_spawn_capacity(world: &World) -> bool {
        world.bots.len() < world.bot_capacity
    }

    /// Reports whether the store is full and every bot in it is dead.
    #[must_use]
    pub fn wave_exhausted(world: &World) -> bool {
        !has_spawn_capacity(world) && world.bots.iter().all(|bot| !bot.is_live())
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Zero-based index of the active level.
    #[must_use]
    pub fn level_index(world: &World) -> usize {
        world.level
    }

    /// Parameters of the active level.
    #[must_use]
    pub fn level(world: &World) -> Option<&LevelSpec> {
        world.active_level()
    }

    /// Tower level to damage lookup.
    #[must_use]
    pub fn damage_table(world: &World) -> &DamageTable {
        &world.damage
    }

    /// Window geometry, scroll offset and cursor.
    #[must_use]
    pub fn viewport(world: &World) -> &Viewport {
        &world.viewport
    }

    /// Number of ticks processed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the wave search may expand into the point: inside the
    /// map, not stone, no tower. Bots are ignored and the base is always open.
    #[must_use]
    pub fn is_searchable(world: &World, point: Point) -> bool {
        if point == world.base {
            return world.grid.size().contains(point);
        }
        world.grid.is_passable(point) && tower_at(world, point).is_none()
    }

    /// Classifies a single step of `mover` onto `to`.
    ///
    /// `stuck` grants the congestion override that lets a bot whose search
    /// budget is exhausted pass through gridlocked traffic.
    #[must_use]
    pub fn step_verdict(world: &World, mover: BotId, to: Point, stuck: bool) -> StepVerdict {
        if to == world.base {
            return StepVerdict::ReachesBase;
        }
        if !world.grid.is_passable(to) || tower_at(world, to).is_some() {
            return StepVerdict::Blocked;
        }
        match bot_at(world, to) {
            Some((occupant, _)) if occupant != mover => {
                if stuck {
                    StepVerdict::Override
                } else {
                    StepVerdict::Congested
                }
            }
            _ => StepVerdict::Clear,
        }
    }
}
