#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! ANSI terminal adapter for the embedded tower defence engine.
//!
//! The adapter sits between the simulation and a byte-oriented link: the
//! [`InputDecoder`] turns received bytes into [`etd_core::InputEvent`]
//! values, and the [`Renderer`] turns world state plus render signals into
//! control sequences written through a [`Terminal`].

mod channel;
mod color;
mod decoder;
mod encoder;
mod renderer;

use thiserror::Error;

pub use channel::{ByteChannel, MemoryChannel};
pub use color::{CellStyle, TermColor};
pub use decoder::InputDecoder;
pub use encoder::Terminal;
pub use renderer::{status_message, Renderer};

/// Errors raised while exchanging bytes with the terminal.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The underlying stream failed.
    #[error("terminal i/o failed")]
    Io(#[from] std::io::Error),
    /// The peer closed the link.
    #[error("terminal link closed")]
    Disconnected,
}
