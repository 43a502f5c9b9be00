//! Visible map window and build cursor.

use etd_core::{Direction, MapSize, Point};

/// Cells reserved on every side of the window for the status rows.
pub const BORDER_WIDTH: u8 = 1;

/// Terminal window geometry, scroll offset and cursor position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    width: u8,
    height: u8,
    origin: Point,
    cursor: Point,
}

impl Viewport {
    /// Columns assumed until the terminal reports its size.
    pub const DEFAULT_WIDTH: u8 = 80;
    /// Rows assumed until the terminal reports its size.
    pub const DEFAULT_HEIGHT: u8 = 24;

    pub(crate) const fn new() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            origin: Point::new(0, 0),
            cursor: Point::new(0, 0),
        }
    }

    /// Terminal columns.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Terminal rows.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Map tile shown in the top-left corner of the map area.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Map tile marked by the build cursor.
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    /// Map columns that fit between the borders.
    #[must_use]
    pub const fn visible_columns(&self) -> u8 {
        self.width.saturating_sub(2 * BORDER_WIDTH)
    }

    /// Map rows that fit between the borders.
    #[must_use]
    pub const fn visible_rows(&self) -> u8 {
        self.height.saturating_sub(2 * BORDER_WIDTH)
    }

    /// Reports whether the map tile is currently on screen.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.screen_position(point).is_some()
    }

    /// Terminal cell that shows the map tile, if it is on screen.
    #[must_use]
    pub fn screen_position(&self, point: Point) -> Option<(u8, u8)> {
        let column = point.x().checked_sub(self.origin.x())?;
        let row = point.y().checked_sub(self.origin.y())?;
        if column >= self.visible_columns() || row >= self.visible_rows() {
            return None;
        }
        Some((column + BORDER_WIDTH, row + BORDER_WIDTH))
    }

    pub(crate) fn pan(&mut self, direction: Direction, map: MapSize) -> bool {
        let max_x = map.width().saturating_sub(self.visible_columns());
        let max_y = map.height().saturating_sub(self.visible_rows());
        let (x, y) = (self.origin.x(), self.origin.y());
        let next = match direction {
            Direction::North => Point::new(x, y.saturating_sub(1)),
            Direction::West => Point::new(x.saturating_sub(1), y),
            Direction::South if y < max_y => Point::new(x, y + 1),
            Direction::East if x < max_x => Point::new(x + 1, y),
            Direction::South | Direction::East => self.origin,
        };
        let changed = next != self.origin;
        self.origin = next;
        changed
    }

    pub(crate) fn move_cursor(&mut self, direction: Direction, map: MapSize) -> bool {
        match self.cursor.step(direction, map) {
            Some(next) => {
                self.cursor = next;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_cursor(&mut self, to: Point, map: MapSize) -> bool {
        if !map.contains(to) || to == self.cursor {
            return false;
        }
        self.cursor = to;
        true
    }

    pub(crate) fn resize(&mut self, width: u8, height: u8) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.origin = Point::new(0, 0);
        true
    }
}
