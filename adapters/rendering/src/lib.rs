#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering for observations and the agent's belief map.
//!
//! Rendering never feeds back into decision making. Presenters receive a
//! finished turn and write it somewhere a human can look at it.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use isle_agent_core::{Action, Coordinate, Observation, Tile, TileMapView, VIEW_SIZE};
use isle_agent_world::{query, Pose, WorldModel};

/// Draws the 5×5 observation inside a box, agent in the centre.
#[must_use]
pub fn render_observation(observation: &Observation) -> String {
    let border = format!("+{}+", "-".repeat(VIEW_SIZE));
    let mut lines = Vec::with_capacity(VIEW_SIZE + 2);
    lines.push(border.clone());
    for row in observation.to_symbol_rows() {
        lines.push(format!("|{row}|"));
    }
    lines.push(border);
    lines.join("\n")
}

/// Draws the known part of the belief map, north at the top.
///
/// The output is cropped to the bounding box of every non-unknown cell. The
/// agent is drawn from `pose`; any other player stamp is shown as open ground.
#[must_use]
pub fn render_belief(view: &TileMapView<'_>, pose: Pose) -> String {
    let known = (0..view.len())
        .filter_map(|index| view.coordinate(index))
        .filter(|cell| view.tile(*cell) != Tile::Unknown)
        .chain(std::iter::once(pose.position()));
    let Some((min, max)) = bounds(known) else {
        return String::new();
    };

    let mut lines = Vec::new();
    for y in (min.y()..=max.y()).rev() {
        let line: String = (min.x()..=max.x())
            .map(|x| {
                let cell = Coordinate::new(x, y);
                if cell == pose.position() {
                    return pose.facing().glyph();
                }
                match view.tile(cell) {
                    Tile::PlayerFacing(_) => Tile::Empty.symbol(),
                    tile => tile.symbol(),
                }
            })
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

fn bounds<I>(cells: I) -> Option<(Coordinate, Coordinate)>
where
    I: IntoIterator<Item = Coordinate>,
{
    cells.into_iter().fold(None, |acc, cell| {
        let (min, max) = acc.unwrap_or((cell, cell));
        Some((
            Coordinate::new(min.x().min(cell.x()), min.y().min(cell.y())),
            Coordinate::new(max.x().max(cell.x()), max.y().max(cell.y())),
        ))
    })
}

/// Everything a presenter needs to show one finished turn.
#[derive(Clone, Copy, Debug)]
pub struct TurnFrame<'a> {
    /// Zero-based turn number.
    pub turn: u64,
    /// Observation received at the start of the turn.
    pub observation: &'a Observation,
    /// Action chosen for the turn.
    pub action: Action,
    /// Belief state after the action was applied.
    pub world: &'a WorldModel,
}

/// Destination for rendered turns.
pub trait Presenter {
    /// Shows a single turn.
    fn present(&mut self, frame: &TurnFrame<'_>) -> AnyResult<()>;
}

/// Presenter that writes plain text to any writer.
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    /// Creates a presenter writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, frame: &TurnFrame<'_>) -> AnyResult<()> {
        let inventory = query::inventory(frame.world);
        writeln!(
            self.out,
            "turn {} action {} stones {} key {} axe {} treasure {}",
            frame.turn,
            frame.action.symbol(),
            inventory.bridge_resources(),
            inventory.has_key(),
            inventory.has_axe(),
            inventory.has_treasure(),
        )
        .context("failed to write turn header")?;
        writeln!(self.out, "{}", render_observation(frame.observation))
            .context("failed to write observation")?;
        writeln!(
            self.out,
            "{}\n",
            render_belief(&query::tile_view(frame.world), query::pose(frame.world))
        )
        .context("failed to write belief map")?;
        self.out.flush().context("failed to flush presenter output")
    }
}
