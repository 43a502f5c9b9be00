//! Escape-sequence input decoder.

use etd_core::{Direction, InputEvent};
use tracing::trace;

const ESCAPE: u8 = 0x1b;
const MAX_PARAMETERS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    Ground,
    Escape,
    Csi {
        parameters: [u16; MAX_PARAMETERS],
        count: usize,
    },
}

/// Incremental decoder turning received bytes into player input.
///
/// Recognised input: arrow keys pan the view, `w` `a` `s` `d` move the build
/// cursor, `b` builds, `u` upgrades, space inspects, `q` quits, and the
/// terminal's `ESC [ 8 ; rows ; cols t` size report resizes the viewport.
/// Anything else is discarded.
#[derive(Clone, Copy, Debug)]
pub struct InputDecoder {
    state: DecodeState,
}

impl InputDecoder {
    /// Creates a decoder in its initial state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Ground,
        }
    }

    /// Feeds one byte, returning an event when it completes one.
    pub fn feed(&mut self, byte: u8) -> Option<InputEvent> {
        match self.state {
            DecodeState::Ground => self.ground(byte),
            DecodeState::Escape => {
                self.state = if byte == b'[' {
                    DecodeState::Csi {
                        parameters: [0; MAX_PARAMETERS],
                        count: 0,
                    }
                } else {
                    DecodeState::Ground
                };
                None
            }
            DecodeState::Csi {
                mut parameters,
                mut count,
            } => match byte {
                b'0'..=b'9' => {
                    count = count.max(1);
                    let index = count - 1;
                    parameters[index] = parameters[index]
                        .saturating_mul(10)
                        .saturating_add(u16::from(byte - b'0'));
                    self.state = DecodeState::Csi { parameters, count };
                    None
                }
                b';' if count.max(1) < MAX_PARAMETERS => {
                    count = count.max(1) + 1;
                    self.state = DecodeState::Csi { parameters, count };
                    None
                }
                b';' => {
                    trace!("control sequence has too many parameters, dropped");
                    self.state = DecodeState::Ground;
                    None
                }
                final_byte => {
                    self.state = DecodeState::Ground;
                    csi_event(final_byte, &parameters[..count])
                }
            },
        }
    }

    /// Feeds every byte of `bytes`, pushing completed events into `out`.
    pub fn feed_all(&mut self, bytes: &[u8], out: &mut Vec<InputEvent>) {
        out.extend(bytes.iter().filter_map(|byte| self.feed(*byte)));
    }

    fn ground(&mut self, byte: u8) -> Option<InputEvent> {
        match byte {
            ESCAPE => {
                self.state = DecodeState::Escape;
                None
            }
            b'w' => Some(InputEvent::MoveCursor(Direction::North)),
            b'a' => Some(InputEvent::MoveCursor(Direction::West)),
            b's' => Some(InputEvent::MoveCursor(Direction::South)),
            b'd' => Some(InputEvent::MoveCursor(Direction::East)),
            b'b' => Some(InputEvent::Build),
            b'u' => Some(InputEvent::Upgrade),
            b' ' => Some(InputEvent::Inspect),
            b'q' => Some(InputEvent::Quit),
            _ => None,
        }
    }
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn csi_event(final_byte: u8, parameters: &[u16]) -> Option<InputEvent> {
    match (final_byte, parameters) {
        (b'A', _) => Some(InputEvent::Pan(Direction::North)),
        (b'B', _) => Some(InputEvent::Pan(Direction::South)),
        (b'C', _) => Some(InputEvent::Pan(Direction::East)),
        (b'D', _) => Some(InputEvent::Pan(Direction::West)),
        (b't', [8, rows, columns]) => Some(InputEvent::Resize {
            width: clamp_cells(*columns),
            height: clamp_cells(*rows),
        }),
        _ => None,
    }
}

fn clamp_cells(value: u16) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}
