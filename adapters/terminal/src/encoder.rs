//! ANSI control-sequence writer.

use std::fmt::Write as _;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    Command,
};

use crate::{ByteChannel, CellStyle, TermColor, TerminalError};

/// Encodes drawing primitives as control sequences on top of a byte channel.
///
/// The last colours written are remembered so repeated cells in the same
/// style only cost their glyph.
#[derive(Debug)]
pub struct Terminal<C> {
    channel: C,
    foreground: Option<TermColor>,
    background: Option<TermColor>,
    scratch: String,
}

impl<C: ByteChannel> Terminal<C> {
    /// Wraps `channel`.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            foreground: None,
            background: None,
            scratch: String::with_capacity(16),
        }
    }

    /// Underlying channel, mutably; used to drain input.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Switches to the alternate screen, clears it and hides the cursor.
    pub fn enter(&mut self) -> Result<(), TerminalError> {
        self.command(EnterAlternateScreen)?;
        self.clear()?;
        self.hide_cursor()
    }

    /// Restores the primary screen and the cursor.
    pub fn leave(&mut self) -> Result<(), TerminalError> {
        self.reset_colors()?;
        self.show_cursor()?;
        self.command(LeaveAlternateScreen)?;
        self.flush()
    }

    /// Clears the whole screen.
    pub fn clear(&mut self) -> Result<(), TerminalError> {
        self.command(Clear(ClearType::All))
    }

    /// Hides the text cursor.
    pub fn hide_cursor(&mut self) -> Result<(), TerminalError> {
        self.command(Hide)
    }

    /// Shows the text cursor.
    pub fn show_cursor(&mut self) -> Result<(), TerminalError> {
        self.command(Show)
    }

    /// Asks the terminal to report its size in characters.
    pub fn request_size(&mut self) -> Result<(), TerminalError> {
        self.raw(b"\x1b[18t")
    }

    /// Places the text cursor on zero-based column `x`, row `y`.
    pub fn move_to(&mut self, x: u8, y: u8) -> Result<(), TerminalError> {
        self.command(MoveTo(u16::from(x), u16::from(y)))
    }

    /// Sets the text colour unless it is already active.
    pub fn set_foreground(&mut self, color: TermColor) -> Result<(), TerminalError> {
        if self.foreground == Some(color) {
            return Ok(());
        }
        self.foreground = Some(color);
        self.command(SetForegroundColor(Color::AnsiValue(color.0)))
    }

    /// Sets the cell colour unless it is already active.
    pub fn set_background(&mut self, color: TermColor) -> Result<(), TerminalError> {
        if self.background == Some(color) {
            return Ok(());
        }
        self.background = Some(color);
        self.command(SetBackgroundColor(Color::AnsiValue(color.0)))
    }

    /// Restores default colours and forgets the cached ones.
    pub fn reset_colors(&mut self) -> Result<(), TerminalError> {
        self.foreground = None;
        self.background = None;
        self.command(ResetColor)
    }

    /// Inserts `count` blank cells at the cursor.
    pub fn insert_blanks(&mut self, count: u8) -> Result<(), TerminalError> {
        self.sequence(format_args!("\x1b[{count}@"))
    }

    /// Writes one styled cell at the cursor.
    pub fn put_cell(&mut self, style: CellStyle) -> Result<(), TerminalError> {
        self.set_background(style.background)?;
        self.set_foreground(style.foreground)?;
        self.put_char(style.glyph)
    }

    /// Writes a character at the cursor in the active colours.
    pub fn put_char(&mut self, glyph: char) -> Result<(), TerminalError> {
        let mut encoded = [0_u8; 4];
        self.raw(glyph.encode_utf8(&mut encoded).as_bytes())
    }

    /// Writes text at the cursor in the active colours.
    pub fn put_str(&mut self, text: &str) -> Result<(), TerminalError> {
        self.raw(text.as_bytes())
    }

    /// Pushes queued output to the peer.
    pub fn flush(&mut self) -> Result<(), TerminalError> {
        self.channel.flush()
    }

    fn command(&mut self, command: impl Command) -> Result<(), TerminalError> {
        self.scratch.clear();
        // Writing into a String cannot fail.
        let _ = command.write_ansi(&mut self.scratch);
        self.channel.send(self.scratch.as_bytes())
    }

    fn sequence(&mut self, arguments: std::fmt::Arguments<'_>) -> Result<(), TerminalError> {
        self.scratch.clear();
        // Writing into a String cannot fail.
        let _ = self.scratch.write_fmt(arguments);
        self.channel.send(self.scratch.as_bytes())
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.channel.send(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryChannel;

    fn sent(terminal: &mut Terminal<MemoryChannel>) -> String {
        String::from_utf8(terminal.channel_mut().take_sent()).expect("ascii output")
    }

    #[test]
    fn cursor_positions_are_one_based_row_first() {
        let mut terminal = Terminal::new(MemoryChannel::new());
        terminal.move_to(0, 0).expect("write");
        terminal.move_to(119, 47).expect("write");
        assert_eq!(sent(&mut terminal), "\x1b[1;1H\x1b[48;120H");
    }

    #[test]
    fn repeated_colors_are_suppressed() {
        let mut terminal = Terminal::new(MemoryChannel::new());
        terminal.set_background(TermColor::GRASS_BACKGROUND).expect("write");
        terminal.set_background(TermColor::GRASS_BACKGROUND).expect("write");
        terminal.set_foreground(TermColor::GRASS_FOREGROUND).expect("write");
        terminal.set_foreground(TermColor::GRASS_FOREGROUND).expect("write");
        assert_eq!(sent(&mut terminal), "\x1b[48;5;34m\x1b[38;5;82m");

        terminal.reset_colors().expect("write");
        terminal.set_foreground(TermColor::GRASS_FOREGROUND).expect("write");
        assert_eq!(sent(&mut terminal), "\x1b[0m\x1b[38;5;82m");
    }

    #[test]
    fn session_setup_sequences() {
        let mut terminal = Terminal::new(MemoryChannel::new());
        terminal.enter().expect("write");
        terminal.request_size().expect("write");
        terminal.insert_blanks(3).expect("write");
        assert_eq!(sent(&mut terminal), "\x1b[?1049h\x1b[2J\x1b[?25l\x1b[18t\x1b[3@");
    }

    #[test]
    fn leaving_restores_colors_cursor_and_screen() {
        let mut terminal = Terminal::new(MemoryChannel::new());
        terminal.set_foreground(TermColor::WHITE).expect("write");
        let _ = sent(&mut terminal);

        terminal.leave().expect("write");
        assert_eq!(sent(&mut terminal), "\x1b[0m\x1b[?25h\x1b[?1049l");
    }
}
