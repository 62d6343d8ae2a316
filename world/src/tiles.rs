//! Dense belief-map storage used by the world crate.

use isle_agent_core::{window_index, window_side, Coordinate, Tile, TileMapView};

/// Row-major tile grid covering the working window.
///
/// The grid spans `[-radius, radius]` on both axes and starts out entirely
/// [`Tile::Unknown`]. Writes outside the window are dropped so callers never
/// need to clamp coordinates themselves.
#[derive(Clone, Debug)]
pub(crate) struct TileMap {
    radius: i32,
    cells: Vec<Tile>,
}

impl TileMap {
    /// Creates a fully unknown grid of the provided radius.
    pub(crate) fn new(radius: i32) -> Self {
        let radius = radius.max(0);
        let side = window_side(radius);
        Self {
            radius,
            cells: vec![Tile::Unknown; side.saturating_mul(side)],
        }
    }

    /// Half-width of the grid.
    #[must_use]
    pub(crate) fn radius(&self) -> i32 {
        self.radius
    }

    /// Tile stored at the coordinate, or `None` outside the window.
    #[must_use]
    pub(crate) fn get(&self, cell: Coordinate) -> Option<Tile> {
        window_index(self.radius, cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Tile stored at the coordinate, reading [`Tile::Unknown`] outside the window.
    #[must_use]
    pub(crate) fn tile(&self, cell: Coordinate) -> Tile {
        self.get(cell).unwrap_or(Tile::Unknown)
    }

    /// Overwrites the coordinate, returning the previous tile when it was in range.
    pub(crate) fn set(&mut self, cell: Coordinate, tile: Tile) -> Option<Tile> {
        let index = window_index(self.radius, cell)?;
        let slot = self.cells.get_mut(index)?;
        Some(std::mem::replace(slot, tile))
    }

    /// Read-only view over the dense cells.
    #[must_use]
    pub(crate) fn view(&self) -> TileMapView<'_> {
        TileMapView::new(&self.cells, self.radius)
    }
}
