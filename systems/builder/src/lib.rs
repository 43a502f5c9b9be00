#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns decoded player input into intent commands.

use etd_core::{Command, InputEvent};
use etd_world::Viewport;

/// Translates input events into viewport, cursor and construction commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builder;

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits the command matching `input`.
    ///
    /// Build and upgrade requests target the cursor tile and are dropped
    /// while the cursor is scrolled out of view. `Quit` is left to the
    /// adapter that owns the session.
    pub fn handle(&mut self, input: InputEvent, viewport: &Viewport, out: &mut Vec<Command>) {
        let cursor = viewport.cursor();
        match input {
            InputEvent::Pan(direction) => out.push(Command::PanView { direction }),
            InputEvent::MoveCursor(direction) => out.push(Command::MoveCursor { direction }),
            InputEvent::Build if viewport.contains(cursor) => {
                out.push(Command::BuildTower { at: cursor });
            }
            InputEvent::Upgrade if viewport.contains(cursor) => {
                out.push(Command::UpgradeTower { at: cursor });
            }
            InputEvent::Inspect => out.push(Command::Inspect { at: cursor }),
            InputEvent::Resize { width, height } => {
                out.push(Command::ResizeViewport { width, height });
            }
            InputEvent::Build | InputEvent::Upgrade | InputEvent::Quit => {}
        }
    }
}
