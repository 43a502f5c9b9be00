#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the embedded tower defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters translate decoded input
//! into [`Command`] values, the world executes those commands via its `apply`
//! entry point and broadcasts [`Event`] values, including the render signals
//! a terminal renderer turns into output. Systems read immutable world state
//! and respond exclusively with new command batches.

mod bounded;
mod config;

use serde::{Deserialize, Serialize};

pub use bounded::BoundedBuf;
pub use config::{ConfigError, DamageTable, EngineConfig, LevelSpec, MovementSchedule};

/// Number of bot slots in the entity store.
pub const MAX_BOTS: usize = 32;

/// Number of tower slots in the entity store.
pub const MAX_TOWERS: usize = 128;

/// Number of entry points a map may declare.
pub const MAX_ENTRY_POINTS: usize = 16;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Embedded Tower Defense";

/// Cardinal directions in the fixed order used for every neighbour scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// All directions in scan order. The order is an observable tie-break.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Extent of the map measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    width: u8,
    height: u8,
}

impl MapSize {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Reports whether the point lies inside the extent.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Total number of tiles covered by the extent.
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Tile coordinate. Copied freely; equality is component-wise.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    x: u8,
    y: u8,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Column of the point.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Row of the point.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Neighbour one step away in `direction`, or `None` when the step would
    /// leave `bounds`. Underflow is never wrapped.
    #[must_use]
    pub fn step(self, direction: Direction, bounds: MapSize) -> Option<Point> {
        let next = match direction {
            Direction::North => Point::new(self.x, self.y.checked_sub(1)?),
            Direction::East => Point::new(self.x.checked_add(1)?, self.y),
            Direction::South => Point::new(self.x, self.y.checked_add(1)?),
            Direction::West => Point::new(self.x.checked_sub(1)?, self.y),
        };
        bounds.contains(next).then_some(next)
    }

    /// In-bounds orthogonal neighbours in North, East, South, West order.
    pub fn neighbors(self, bounds: MapSize) -> impl Iterator<Item = Point> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction, bounds))
    }

    /// Distance along the longest axis.
    #[must_use]
    pub fn chebyshev_distance(self, other: Point) -> u8 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Sum of the per-axis distances.
    #[must_use]
    pub fn manhattan_distance(self, other: Point) -> u16 {
        u16::from(self.x.abs_diff(other.x)) + u16::from(self.y.abs_diff(other.y))
    }

    /// Reports whether the points are orthogonally adjacent.
    #[must_use]
    pub fn is_adjacent(self, other: Point) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Terrain classification returned by the tile lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Bare ground.
    #[default]
    Empty,
    /// Impassable rock.
    Stone,
    /// Shallow water; passable.
    Water,
    /// Grass; passable.
    Grass,
}

impl Tile {
    /// Reports whether bots may walk over the tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Tile::Stone)
    }

    /// Two-bit storage code of the tile.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Tile::Empty => 0b00,
            Tile::Stone => 0b01,
            Tile::Water => 0b10,
            Tile::Grass => 0b11,
        }
    }

    /// Decodes the low two bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => Tile::Stone,
            0b10 => Tile::Water,
            0b11 => Tile::Grass,
            _ => Tile::Empty,
        }
    }

    /// Character used for the tile in text maps and on screen.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Stone => '#',
            Tile::Water => '~',
            Tile::Grass => '.',
        }
    }
}

/// Slot index of a bot in the entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(u8);

impl BotId {
    /// Creates a new bot identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Store slot addressed by the identifier.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Slot index of a tower in the entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u8);

impl TowerId {
    /// Creates a new tower identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Store slot addressed by the identifier.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Hostile unit record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bot {
    /// Remaining health; zero means the bot is inert.
    pub health: u8,
    /// Tile currently occupied by the bot.
    pub position: Point,
    /// Consecutive ticks on which path finding failed.
    pub flood_attempts: u8,
}

impl Bot {
    /// Creates a fresh bot at `position`.
    #[must_use]
    pub const fn spawned(position: Point, health: u8) -> Self {
        Self {
            health,
            position,
            flood_attempts: 0,
        }
    }

    /// Reports whether the bot still occupies its tile.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.health > 0
    }
}

/// Defensive structure record. The position never changes once placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tower {
    /// Tile occupied by the tower.
    pub position: Point,
    /// Upgrade level, starting at 1.
    pub level: u8,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by one tick.
    Tick,
    /// Admits a new bot at an entry point if the store has spare capacity.
    SpawnBot {
        /// Tile the bot appears on.
        at: Point,
    },
    /// Moves a bot onto an adjacent free tile and clears its failure counter.
    MoveBot {
        /// Bot being moved.
        bot: BotId,
        /// Destination tile.
        to: Point,
    },
    /// Records that a bot stepped onto the base.
    ReachBase {
        /// Bot that arrived.
        bot: BotId,
    },
    /// Records a failed path search for a bot.
    RecordSearchFailure {
        /// Bot whose search failed.
        bot: BotId,
    },
    /// Teleports a stuck bot to a distant valid tile.
    RelocateBot {
        /// Bot being relocated.
        bot: BotId,
        /// Destination tile.
        to: Point,
    },
    /// Applies tower damage to a bot.
    DamageBot {
        /// Bot being damaged.
        bot: BotId,
        /// Tower dealing the damage.
        tower: TowerId,
        /// Damage dealt before clamping.
        amount: u8,
    },
    /// Clears the exhausted wave and activates the next level.
    AdvanceLevel,
    /// Requests placement of a level 1 tower.
    BuildTower {
        /// Tile the tower should occupy.
        at: Point,
    },
    /// Requests that the tower at the point gains one level.
    UpgradeTower {
        /// Tile of the tower.
        at: Point,
    },
    /// Places the build cursor on a tile.
    SetCursor {
        /// Tile the cursor should mark.
        to: Point,
    },
    /// Moves the build cursor by one tile.
    MoveCursor {
        /// Direction of travel.
        direction: Direction,
    },
    /// Scrolls the visible map window by one tile.
    PanView {
        /// Direction of travel.
        direction: Direction,
    },
    /// Records the terminal window size.
    ResizeViewport {
        /// Columns available on the terminal.
        width: u8,
        /// Rows available on the terminal.
        height: u8,
    },
    /// Requests the health of the bot on a tile.
    Inspect {
        /// Tile being inspected.
        at: Point,
    },
}

/// Kind of redraw a render signal asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// The tile reverted to whatever terrain or structure lies beneath it.
    TileChanged,
    /// An entity now occupies the tile.
    EntityChanged,
}

/// Side-effecting redraw request emitted whenever a visible tile changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderSignal {
    /// What changed.
    pub kind: RenderKind,
    /// Where it changed.
    pub point: Point,
}

impl RenderSignal {
    /// Signal for a tile that reverted to its background.
    #[must_use]
    pub const fn tile(point: Point) -> Self {
        Self {
            kind: RenderKind::TileChanged,
            point,
        }
    }

    /// Signal for a tile that now shows an entity.
    #[must_use]
    pub const fn entity(point: Point) -> Self {
        Self {
            kind: RenderKind::EntityChanged,
            point,
        }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Number of ticks processed so far.
        tick: u64,
    },
    /// A tile needs to be redrawn.
    Redraw(RenderSignal),
    /// A bot entered the map.
    BotSpawned {
        /// Identifier of the new bot.
        bot: BotId,
        /// Entry point it occupies.
        at: Point,
    },
    /// A bot moved between adjacent tiles.
    BotMoved {
        /// Bot that moved.
        bot: BotId,
        /// Previous tile.
        from: Point,
        /// Current tile.
        to: Point,
    },
    /// A move was refused because the destination was not enterable.
    BotMoveRejected {
        /// Bot that stayed in place.
        bot: BotId,
        /// Refused destination.
        to: Point,
    },
    /// A bot stepped onto the base.
    BotReachedBase {
        /// Bot that arrived.
        bot: BotId,
    },
    /// A path search for the bot failed.
    PathSearchFailed {
        /// Bot whose search failed.
        bot: BotId,
        /// Failure counter after the failure was recorded.
        attempts: u8,
    },
    /// A stuck bot was relocated.
    BotRelocated {
        /// Bot that was relocated.
        bot: BotId,
        /// Previous tile.
        from: Point,
        /// Current tile.
        to: Point,
    },
    /// A tower damaged a bot.
    BotDamaged {
        /// Bot that was hit.
        bot: BotId,
        /// Tower that fired.
        tower: TowerId,
        /// Health left after clamping.
        remaining: u8,
    },
    /// A bot's health reached zero.
    BotDestroyed {
        /// Bot that was destroyed.
        bot: BotId,
        /// Tile it vacated.
        at: Point,
    },
    /// The wave was cleared and a new level became active.
    LevelAdvanced {
        /// Zero-based index of the active level.
        level: usize,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Identifier of the new tower.
        tower: TowerId,
        /// Tile it occupies.
        at: Point,
    },
    /// A placement request was refused.
    TowerPlacementRejected {
        /// Requested tile.
        at: Point,
        /// Why the request failed.
        reason: PlacementError,
    },
    /// A tower gained a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// New level.
        level: u8,
    },
    /// An upgrade request was refused.
    TowerUpgradeRejected {
        /// Requested tile.
        at: Point,
        /// Why the request failed.
        reason: UpgradeError,
    },
    /// The gold balance changed.
    GoldChanged {
        /// New balance.
        gold: u32,
    },
    /// The build cursor moved.
    CursorMoved {
        /// Tile now under the cursor.
        to: Point,
    },
    /// The visible map window scrolled.
    ViewPanned {
        /// Map tile shown at the top-left of the window.
        origin: Point,
    },
    /// The terminal window size changed.
    ViewportResized {
        /// Columns.
        width: u8,
        /// Rows.
        height: u8,
    },
    /// A live bot was inspected.
    BotInspected {
        /// Inspected bot.
        bot: BotId,
        /// Its remaining health.
        health: u8,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// Every tower slot is in use.
    TowerLimit,
    /// The gold balance does not cover the build cost.
    InsufficientGold,
    /// The tile lies outside the map.
    OutOfBounds,
    /// The tile is impassable terrain.
    Blocked,
    /// The tile is the base.
    Base,
    /// The tile is an entry point.
    EntryPoint,
    /// A tower or a live bot already occupies the tile.
    Occupied,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower stands on the tile.
    NoTower,
    /// The damage table has no entry for the next level.
    MaxLevel,
    /// The gold balance does not cover the upgrade cost.
    InsufficientGold,
}

/// Discrete player intents produced by the terminal input decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Scroll the visible map window.
    Pan(Direction),
    /// Move the build cursor.
    MoveCursor(Direction),
    /// Build a tower under the cursor.
    Build,
    /// Upgrade the tower under the cursor.
    Upgrade,
    /// Show the health of the bot under the cursor.
    Inspect,
    /// The terminal reported its size.
    Resize {
        /// Columns.
        width: u8,
        /// Rows.
        height: u8,
    },
    /// Leave the game.
    Quit,
}
