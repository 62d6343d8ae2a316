#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spiral search for the next exploration target.
//!
//! A frontier tile is a passable, reachable cell whose 24-cell look-around
//! ring still contains unknown terrain. Standing on one reveals something new.

use isle_agent_core::{Capabilities, Coordinate, Tile, TileMapView};
use isle_agent_system_reachability::reachable_region;

/// Offsets of an outward square spiral, starting with `(0, 0)`.
///
/// The walk turns on the start cell, so its legs run east, north, west and
/// south with lengths 1, 1, 2, 2, 3, 3 and so on.
#[derive(Clone, Debug)]
pub struct Spiral {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
}

impl Spiral {
    /// Creates a spiral positioned on its centre.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            dx: 0,
            dy: -1,
        }
    }
}

impl Default for Spiral {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = (self.x, self.y);

        let corner = self.x == self.y
            || (self.x < 0 && self.x == -self.y)
            || (self.x > 0 && self.x == 1 - self.y);
        if corner {
            let dx = self.dx;
            self.dx = -self.dy;
            self.dy = dx;
        }
        self.x = self.x.saturating_add(self.dx);
        self.y = self.y.saturating_add(self.dy);

        Some(current)
    }
}

/// Returns the closest frontier tile along the spiral around `start`.
///
/// The walk is bounded to `radius² + 1` steps of the window radius. When no
/// frontier tile qualifies, `start` itself is returned and callers treat that
/// as "nothing left to explore".
#[must_use]
pub fn next_frontier(
    view: &TileMapView<'_>,
    start: Coordinate,
    capabilities: Capabilities,
) -> Coordinate {
    let region = reachable_region(view, start, capabilities);
    let radius = usize::try_from(view.radius()).unwrap_or(0);
    let steps = radius.saturating_mul(radius).saturating_add(1);

    Spiral::new()
        .take(steps)
        .map(|(dx, dy)| start.offset(dx, dy))
        .filter(|cell| *cell != start && view.contains(*cell))
        .find(|cell| {
            view.is_passable(*cell, capabilities)
                && borders_unknown(view, *cell)
                && region.contains(*cell)
        })
        .unwrap_or(start)
}

/// Reports whether any in-window cell of the look-around ring is unknown.
///
/// Cells beyond the working window are never counted.
#[must_use]
pub fn borders_unknown(view: &TileMapView<'_>, cell: Coordinate) -> bool {
    cell.look_around()
        .any(|around| view.contains(around) && view.tile(around) == Tile::Unknown)
}
