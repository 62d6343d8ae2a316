//! Session recordings stored as JSON lines.
//!
//! One [`TurnRecord`] is written per turn. Recordings can be fed back into a
//! fresh planner to check that it still makes the same decisions.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use isle_agent_core::{Action, Observation};
use isle_agent_system_planner::{Config, Planner};
use serde::{Deserialize, Serialize};

/// A single recorded turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TurnRecord {
    /// Zero-based turn number.
    pub(crate) turn: u64,
    /// The five view rows as received, centre drawn as the agent glyph.
    pub(crate) view: Vec<String>,
    /// Symbol of the action sent in reply.
    pub(crate) action: char,
}

impl TurnRecord {
    pub(crate) fn new(turn: u64, observation: &Observation, action: Action) -> Self {
        Self {
            turn,
            view: observation.to_symbol_rows(),
            action: action.symbol(),
        }
    }
}

/// Appends turn records to a writer.
pub(crate) struct Recorder {
    out: Box<dyn Write>,
}

impl Recorder {
    pub(crate) fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    pub(crate) fn record(&mut self, record: &TurnRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)
            .with_context(|| format!("failed to serialise turn {}", record.turn))?;
        writeln!(self.out).context("failed to terminate record line")?;
        self.out.flush().context("failed to flush recording")
    }
}

/// Reads every record from a JSON-lines stream, skipping blank lines.
pub(crate) fn read_records<R: BufRead>(reader: R) -> Result<Vec<TurnRecord>> {
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("line {} is not a turn record", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// First turn at which a replayed planner disagrees with the recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Divergence {
    pub(crate) turn: u64,
    pub(crate) recorded: Action,
    pub(crate) replayed: Action,
}

/// Feeds the recorded observations into a fresh planner.
///
/// Returns the first divergence, or `None` when every action matches.
pub(crate) fn replay(records: &[TurnRecord], config: Config) -> Result<Option<Divergence>> {
    let mut planner = Planner::new(config);

    for record in records {
        let observation = Observation::parse(&record.view)
            .with_context(|| format!("turn {} holds an invalid view", record.turn))?;
        let recorded = Action::from_symbol(record.action)
            .with_context(|| format!("turn {} holds an invalid action", record.turn))?;

        let replayed = planner.next_action(observation);
        if replayed != recorded {
            return Ok(Some(Divergence {
                turn: record.turn,
                recorded,
                replayed,
            }));
        }
    }

    Ok(None)
}
