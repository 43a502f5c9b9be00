//! Incremental screen renderer driven by world render signals.

use etd_core::{Event, PlacementError, Point, Tile, UpgradeError};
use etd_world::{query, TileLookup, Viewport, World, BORDER_WIDTH};
use tracing::trace;

use crate::{ByteChannel, CellStyle, TermColor, Terminal, TerminalError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frame {
    width: u8,
    height: u8,
    origin: Point,
}

impl Frame {
    fn of(viewport: &Viewport) -> Self {
        Self {
            width: viewport.width(),
            height: viewport.height(),
            origin: viewport.origin(),
        }
    }
}

/// Translates world state and render signals into terminal output.
///
/// The whole window is repainted when its geometry or scroll offset changes;
/// otherwise only cells named by render signals and the status row are
/// rewritten.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    frame: Option<Frame>,
    message: Option<String>,
}

impl Renderer {
    /// Creates a renderer that will repaint everything on its first frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the effects of `events` on top of the previous frame.
    pub fn render<C: ByteChannel>(
        &mut self,
        terminal: &mut Terminal<C>,
        world: &World,
        events: &[Event],
    ) -> Result<(), TerminalError> {
        let mut status_dirty = false;
        for event in events {
            if let Some(message) = status_message(event) {
                self.message = Some(message);
                status_dirty = true;
            }
            if matches!(
                event,
                Event::GoldChanged { .. } | Event::LevelAdvanced { .. }
            ) {
                status_dirty = true;
            }
        }

        let viewport = query::viewport(world);
        let frame = Frame::of(viewport);
        if self.frame == Some(frame) {
            for event in events {
                if let Event::Redraw(signal) = event {
                    draw_cell(terminal, world, signal.point)?;
                }
            }
            if status_dirty {
                self.draw_status(terminal, world)?;
            }
        } else {
            trace!(?frame, "full repaint");
            self.repaint(terminal, world)?;
            self.frame = Some(frame);
        }

        match viewport.screen_position(viewport.cursor()) {
            Some((x, y)) => {
                terminal.move_to(x, y)?;
                terminal.show_cursor()?;
            }
            None => terminal.hide_cursor()?,
        }
        terminal.flush()
    }

    fn repaint<C: ByteChannel>(
        &self,
        terminal: &mut Terminal<C>,
        world: &World,
    ) -> Result<(), TerminalError> {
        let viewport = query::viewport(world);
        let (width, height) = (viewport.width(), viewport.height());
        terminal.reset_colors()?;
        terminal.clear()?;
        if width == 0 || height == 0 {
            return Ok(());
        }

        draw_border_row(terminal, 0, width, query::welcome_banner(world))?;

        for row in BORDER_WIDTH..height.saturating_sub(BORDER_WIDTH) {
            terminal.move_to(0, row)?;
            terminal.put_cell(CellStyle::border())?;
            let map_row = row - BORDER_WIDTH;
            for column in 0..viewport.visible_columns() {
                let origin = viewport.origin();
                let style = match (
                    origin.x().checked_add(column),
                    origin.y().checked_add(map_row),
                ) {
                    (Some(x), Some(y)) => cell_style(world, Point::new(x, y)),
                    _ => CellStyle::tile(Tile::Empty),
                };
                terminal.put_cell(style)?;
            }
            if width > BORDER_WIDTH {
                terminal.put_cell(CellStyle::border())?;
            }
        }

        self.draw_status(terminal, world)
    }

    fn draw_status<C: ByteChannel>(
        &self,
        terminal: &mut Terminal<C>,
        world: &World,
    ) -> Result<(), TerminalError> {
        let viewport = query::viewport(world);
        let Some(row) = viewport.height().checked_sub(1) else {
            return Ok(());
        };
        if row == 0 {
            return Ok(());
        }

        let level = query::level(world).map_or("", |level| level.name.as_str());
        let mut text = format!(" Gold: {}  Level: {}", query::gold(world), level);
        if let Some(message) = &self.message {
            text.push_str("  ");
            text.push_str(message);
        }

        draw_border_row(terminal, row, viewport.width(), &text)
    }
}

/// Status-row text announcing the outcome of a player action.
#[must_use]
pub fn status_message(event: &Event) -> Option<String> {
    let message = match event {
        Event::TowerPlaced { .. } => "Tower Built Successfully",
        Event::TowerPlacementRejected { reason, .. } => match reason {
            PlacementError::TowerLimit => "Tower Limit Exceeded",
            PlacementError::InsufficientGold => "More Gold Required",
            PlacementError::OutOfBounds
            | PlacementError::Blocked
            | PlacementError::Base
            | PlacementError::EntryPoint
            | PlacementError::Occupied => "Cannot Build Here",
        },
        Event::TowerUpgraded { .. } => "Tower Upgraded",
        Event::TowerUpgradeRejected { reason, .. } => match reason {
            UpgradeError::NoTower => "No Tower Here",
            UpgradeError::MaxLevel => "Tower At Max Level",
            UpgradeError::InsufficientGold => "More Gold Required",
        },
        Event::LevelAdvanced { .. } => "Level Cleared",
        Event::BotInspected { health, .. } => return Some(format!("{health}HP")),
        _ => return None,
    };
    Some(message.to_owned())
}

fn draw_cell<C: ByteChannel>(
    terminal: &mut Terminal<C>,
    world: &World,
    point: Point,
) -> Result<(), TerminalError> {
    let Some((x, y)) = query::viewport(world).screen_position(point) else {
        return Ok(());
    };
    terminal.move_to(x, y)?;
    terminal.put_cell(cell_style(world, point))
}

fn cell_style(world: &World, point: Point) -> CellStyle {
    if point == query::base(world) {
        return CellStyle::base();
    }
    if let Some((_, tower)) = query::tower_at(world, point) {
        return CellStyle::tower(tower.level);
    }
    if query::bot_at(world, point).is_some() {
        return CellStyle::bot();
    }
    CellStyle::tile(query::tile_grid(world).tile_at(point).unwrap_or_default())
}

/// Blanks screen row `row` in the border colours, then writes `text` from
/// its first column, cut to `width` characters.
fn draw_border_row<C: ByteChannel>(
    terminal: &mut Terminal<C>,
    row: u8,
    width: u8,
    text: &str,
) -> Result<(), TerminalError> {
    terminal.set_background(TermColor::BORDER)?;
    terminal.set_foreground(TermColor::WHITE)?;
    terminal.move_to(0, row)?;
    terminal.insert_blanks(width)?;
    terminal.put_str(&truncate(text, usize::from(width)))
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_text_is_cut_to_the_window() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abcd");
    }

    #[test]
    fn border_rows_are_blanked_before_text() {
        let mut terminal = Terminal::new(crate::MemoryChannel::new());
        draw_border_row(&mut terminal, 4, 6, "Gold: 30000").expect("write");
        let output = String::from_utf8(terminal.channel_mut().take_sent()).expect("utf-8");
        assert_eq!(output, "\x1b[48;5;235m\x1b[38;5;231m\x1b[5;1H\x1b[6@Gold: ");
    }

    #[test]
    fn placement_failures_share_a_message() {
        let event = Event::TowerPlacementRejected {
            at: Point::new(0, 0),
            reason: PlacementError::EntryPoint,
        };
        assert_eq!(status_message(&event).as_deref(), Some("Cannot Build Here"));
    }
}
