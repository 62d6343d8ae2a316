//! Turn transport to the game server.
//!
//! Each turn the server sends the 24 symbols of the agent's view, row-major
//! with the centre omitted, and expects a single action byte in reply. A clean
//! end of stream between turns means the game is over.

use std::io::{ErrorKind, Read, Write};

use anyhow::{bail, Context, Result};
use isle_agent_core::{Action, Observation, WIRE_CELLS};

/// Framed connection carrying observations in and actions out.
#[derive(Debug)]
pub(crate) struct Session<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> Session<R, W> {
    pub(crate) fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next observation, or `None` once the server hangs up.
    pub(crate) fn read_observation(&mut self) -> Result<Option<Observation>> {
        let mut buffer = [0_u8; WIRE_CELLS];
        let mut filled = 0;

        while filled < WIRE_CELLS {
            match self.reader.read(&mut buffer[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => bail!(
                    "connection closed after {filled} of {WIRE_CELLS} observation bytes"
                ),
                Ok(read) => filled += read,
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => return Err(error).context("failed to read observation"),
            }
        }

        Observation::from_wire(&buffer)
            .map(Some)
            .context("server sent a malformed observation")
    }

    /// Sends one action byte.
    pub(crate) fn send_action(&mut self, action: Action) -> Result<()> {
        let byte = u8::try_from(action.symbol()).context("action symbol is not a single byte")?;
        self.writer
            .write_all(&[byte])
            .context("failed to send action")?;
        self.writer.flush().context("failed to flush action")
    }
}
