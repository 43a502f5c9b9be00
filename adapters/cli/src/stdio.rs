//! Byte channel over the process's standard streams.

use std::{
    collections::VecDeque,
    io::{self, BufWriter, Read, Stdout, Write},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use etd_terminal::{ByteChannel, TerminalError};

/// Standard output for drawing, standard input drained by a reader thread.
///
/// The reader thread is the only code that blocks on input; the game loop
/// polls the queue it fills.
#[derive(Debug)]
pub(crate) struct StdioChannel {
    output: BufWriter<Stdout>,
    input: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl StdioChannel {
    pub(crate) fn spawn() -> io::Result<Self> {
        let (sender, input) = mpsc::channel();
        let _reader = thread::Builder::new()
            .name("stdin-reader".to_owned())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buffer = [0_u8; 64];
                loop {
                    match stdin.read(&mut buffer) {
                        Ok(0) | Err(_) => break,
                        Ok(read) => {
                            if sender.send(buffer[..read].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
            })?;

        Ok(Self {
            output: BufWriter::new(io::stdout()),
            input,
            pending: VecDeque::new(),
        })
    }
}

impl ByteChannel for StdioChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.output.write_all(bytes)?;
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TerminalError> {
        loop {
            match self.input.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if self.pending.is_empty() => {
                    return Err(TerminalError::Disconnected);
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }

        let count = buffer.len().min(self.pending.len());
        for (slot, byte) in buffer.iter_mut().zip(self.pending.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), TerminalError> {
        self.output.flush()?;
        Ok(())
    }
}
