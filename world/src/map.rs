//! Static tile lookup backed by a packed two-bit-per-tile grid.

use etd_core::{BoundedBuf, MapSize, Point, Tile, MAX_ENTRY_POINTS};
use thiserror::Error;

const DEFAULT_MAP: &str = include_str!("../maps/default.map");

const BASE_GLYPH: char = 'B';
const ENTRY_GLYPH: char = 'E';
const TILES_PER_BYTE: usize = 4;

/// Read-only terrain classification consumed by the simulation.
///
/// Implementations must be pure and deterministic; the engine never mutates
/// terrain.
pub trait TileLookup {
    /// Extent of the map.
    fn size(&self) -> MapSize;

    /// Terrain at `point`, or `None` outside the map.
    fn tile_at(&self, point: Point) -> Option<Tile>;

    /// Reports whether bots may stand on `point`.
    fn is_passable(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(Tile::is_passable)
    }
}

/// Terrain grid storing four tiles per byte, lowest bits first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    size: MapSize,
    packed: Vec<u8>,
}

impl TileGrid {
    fn filled(size: MapSize) -> Self {
        let bytes = size.area().div_ceil(TILES_PER_BYTE);
        Self {
            size,
            packed: vec![0; bytes],
        }
    }

    fn set(&mut self, point: Point, tile: Tile) {
        let Some(index) = self.index(point) else {
            return;
        };
        let shift = (index % TILES_PER_BYTE) * 2;
        if let Some(byte) = self.packed.get_mut(index / TILES_PER_BYTE) {
            *byte = (*byte & !(0b11 << shift)) | (tile.bits() << shift);
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        if !self.size.contains(point) {
            return None;
        }
        Some(usize::from(point.y()) * usize::from(self.size.width()) + usize::from(point.x()))
    }
}

impl TileLookup for TileGrid {
    fn size(&self) -> MapSize {
        self.size
    }

    fn tile_at(&self, point: Point) -> Option<Tile> {
        let index = self.index(point)?;
        let byte = self.packed.get(index / TILES_PER_BYTE)?;
        Some(Tile::from_bits(byte >> ((index % TILES_PER_BYTE) * 2)))
    }
}

/// Terrain plus the fixed base and entry points of a map.
#[derive(Clone, Debug)]
pub struct MapLayout {
    grid: TileGrid,
    base: Point,
    entry_points: BoundedBuf<Point, MAX_ENTRY_POINTS>,
}

impl MapLayout {
    /// Parses a text map.
    ///
    /// `#` is stone, `~` water, `.` grass, a space empty ground, `B` the base
    /// and `E` an entry point; the last two sit on empty ground.
    pub fn parse(source: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = source
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let rows = match rows.iter().rposition(|row| !row.is_empty()) {
            Some(last) => &rows[..=last],
            None => return Err(MapError::Empty),
        };

        let width = rows[0].chars().count();
        let height = rows.len();
        let width_u8 = u8::try_from(width).map_err(|_| MapError::TooLarge { width, height })?;
        let height_u8 = u8::try_from(height).map_err(|_| MapError::TooLarge { width, height })?;
        if width_u8 == 0 {
            return Err(MapError::Empty);
        }

        let mut grid = TileGrid::filled(MapSize::new(width_u8, height_u8));
        let mut base = None;
        let mut entry_points = BoundedBuf::new();

        for (y, row) in (0..height_u8).zip(rows) {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(MapError::RaggedRow {
                    row: usize::from(y),
                    expected: width,
                    found: row_width,
                });
            }

            for (x, glyph) in (0..width_u8).zip(row.chars()) {
                let point = Point::new(x, y);
                let tile = match glyph {
                    '#' => Tile::Stone,
                    '~' => Tile::Water,
                    '.' => Tile::Grass,
                    ' ' => Tile::Empty,
                    BASE_GLYPH => {
                        if base.replace(point).is_some() {
                            return Err(MapError::DuplicateBase);
                        }
                        Tile::Empty
                    }
                    ENTRY_GLYPH => {
                        if entry_points.try_push(point).is_none() {
                            return Err(MapError::TooManyEntryPoints {
                                limit: MAX_ENTRY_POINTS,
                            });
                        }
                        Tile::Empty
                    }
                    other => return Err(MapError::UnknownGlyph { glyph: other, x, y }),
                };
                grid.set(point, tile);
            }
        }

        let base = base.ok_or(MapError::MissingBase)?;
        Ok(Self {
            grid,
            base,
            entry_points,
        })
    }

    /// Layout shipped with the engine.
    pub fn builtin() -> Result<Self, MapError> {
        Self::parse(DEFAULT_MAP)
    }

    /// Terrain of the map.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Goal tile of every bot.
    #[must_use]
    pub fn base(&self) -> Point {
        self.base
    }

    /// Tiles where bots are admitted.
    #[must_use]
    pub fn entry_points(&self) -> &[Point] {
        self.entry_points.as_slice()
    }

    pub(crate) fn into_parts(self) -> (TileGrid, Point, BoundedBuf<Point, MAX_ENTRY_POINTS>) {
        (self.grid, self.base, self.entry_points)
    }
}

/// Reasons a text map could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// The map contained no rows.
    #[error("map is empty")]
    Empty,
    /// The map exceeds the coordinate range.
    #[error("map of {width}x{height} tiles exceeds 255x255")]
    TooLarge {
        /// Columns found.
        width: usize,
        /// Rows found.
        height: usize,
    },
    /// A row differed in length from the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character did not name a tile.
    #[error("unknown map glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        x: u8,
        /// Row of the character.
        y: u8,
    },
    /// No base was marked.
    #[error("map does not mark a base")]
    MissingBase,
    /// More than one base was marked.
    #[error("map marks more than one base")]
    DuplicateBase,
    /// Too many entry points were marked.
    #[error("map marks more than {limit} entry points")]
    TooManyEntryPoints {
        /// Maximum supported entry points.
        limit: usize,
    },
}
