//! 256-colour palette used for every glyph on screen.

use etd_core::Tile;

/// Index into the xterm 256-colour palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermColor(pub u8);

impl TermColor {
    /// Base tile, `#d7af00`.
    pub const BASE: Self = Self(178);
    /// Window border and status rows, `#262626`.
    pub const BORDER: Self = Self(235);
    /// Bot background, `#d70000`.
    pub const BOT_BACKGROUND: Self = Self(160);
    /// Bot glyph, `#ff5f00`.
    pub const BOT_FOREGROUND: Self = Self(202);
    /// Tower background, `#af00ff`.
    pub const TOWER_BACKGROUND: Self = Self(129);
    /// Tower level digit and status text, `#ffffff`.
    pub const WHITE: Self = Self(231);
    /// Stone background, `#3a3a3a`.
    pub const STONE_BACKGROUND: Self = Self(237);
    /// Stone glyph, `#606060`.
    pub const STONE_FOREGROUND: Self = Self(241);
    /// Water background, `#005fff`.
    pub const WATER_BACKGROUND: Self = Self(27);
    /// Water glyph, `#00afff`.
    pub const WATER_FOREGROUND: Self = Self(39);
    /// Grass background, `#00af00`.
    pub const GRASS_BACKGROUND: Self = Self(34);
    /// Grass glyph, `#5fff00`.
    pub const GRASS_FOREGROUND: Self = Self(82);
    /// Bare ground, `#000000`.
    pub const BLACK: Self = Self(16);
}

/// Glyph plus colours of one terminal cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// Character shown in the cell.
    pub glyph: char,
    /// Text colour.
    pub foreground: TermColor,
    /// Cell colour.
    pub background: TermColor,
}

impl CellStyle {
    /// Style of a terrain tile without entities.
    #[must_use]
    pub const fn tile(tile: Tile) -> Self {
        let (background, foreground) = match tile {
            Tile::Stone => (TermColor::STONE_BACKGROUND, TermColor::STONE_FOREGROUND),
            Tile::Water => (TermColor::WATER_BACKGROUND, TermColor::WATER_FOREGROUND),
            Tile::Grass => (TermColor::GRASS_BACKGROUND, TermColor::GRASS_FOREGROUND),
            Tile::Empty => (TermColor::BLACK, TermColor::BLACK),
        };
        Self {
            glyph: tile.glyph(),
            foreground,
            background,
        }
    }

    /// Style of a live bot.
    #[must_use]
    pub const fn bot() -> Self {
        Self {
            glyph: '%',
            foreground: TermColor::BOT_FOREGROUND,
            background: TermColor::BOT_BACKGROUND,
        }
    }

    /// Style of a tower, showing its level as a digit.
    #[must_use]
    pub fn tower(level: u8) -> Self {
        let glyph = char::from_digit(u32::from(level.min(9)), 10).unwrap_or('?');
        Self {
            glyph,
            foreground: TermColor::WHITE,
            background: TermColor::TOWER_BACKGROUND,
        }
    }

    /// Style of the base tile.
    #[must_use]
    pub const fn base() -> Self {
        Self {
            glyph: ' ',
            foreground: TermColor::BASE,
            background: TermColor::BASE,
        }
    }

    /// Style of a border cell.
    #[must_use]
    pub const fn border() -> Self {
        Self {
            glyph: ' ',
            foreground: TermColor::WHITE,
            background: TermColor::BORDER,
        }
    }
}
