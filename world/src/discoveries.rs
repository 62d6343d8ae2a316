//! Indices of observed-but-uncollected resources.

use std::collections::BTreeSet;

use isle_agent_core::{Coordinate, Tile};

/// Categories of cells tracked by the discovered-resource indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Axes lying on the ground.
    Axe,
    /// Keys lying on the ground.
    Key,
    /// Uncollected stepping stones.
    BridgeResource,
    /// Water cells that have not been bridged.
    Water,
    /// Open ground.
    Empty,
    /// Standing trees.
    Tree,
    /// Locked doors.
    Door,
}

impl Resource {
    /// Index category for the tile, if the tile is tracked.
    #[must_use]
    pub const fn of(tile: Tile) -> Option<Self> {
        match tile {
            Tile::Axe => Some(Self::Axe),
            Tile::Key => Some(Self::Key),
            Tile::BridgeResource => Some(Self::BridgeResource),
            Tile::Water => Some(Self::Water),
            Tile::Empty => Some(Self::Empty),
            Tile::Tree => Some(Self::Tree),
            Tile::Door => Some(Self::Door),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Discoveries {
    axes: BTreeSet<Coordinate>,
    keys: BTreeSet<Coordinate>,
    bridge_resources: BTreeSet<Coordinate>,
    water: BTreeSet<Coordinate>,
    empty: BTreeSet<Coordinate>,
    trees: BTreeSet<Coordinate>,
    doors: BTreeSet<Coordinate>,
    treasure: Option<Coordinate>,
}

impl Discoveries {
    pub(crate) fn get(&self, resource: Resource) -> &BTreeSet<Coordinate> {
        match resource {
            Resource::Axe => &self.axes,
            Resource::Key => &self.keys,
            Resource::BridgeResource => &self.bridge_resources,
            Resource::Water => &self.water,
            Resource::Empty => &self.empty,
            Resource::Tree => &self.trees,
            Resource::Door => &self.doors,
        }
    }

    fn get_mut(&mut self, resource: Resource) -> &mut BTreeSet<Coordinate> {
        match resource {
            Resource::Axe => &mut self.axes,
            Resource::Key => &mut self.keys,
            Resource::BridgeResource => &mut self.bridge_resources,
            Resource::Water => &mut self.water,
            Resource::Empty => &mut self.empty,
            Resource::Tree => &mut self.trees,
            Resource::Door => &mut self.doors,
        }
    }

    pub(crate) fn treasure(&self) -> Option<Coordinate> {
        self.treasure
    }

    /// Brings the indices in line with a tile change at `cell`.
    ///
    /// Returns `true` when the coordinate was newly indexed.
    pub(crate) fn record(&mut self, cell: Coordinate, previous: Tile, current: Tile) -> bool {
        if current == Tile::Treasure && self.treasure.is_none() {
            self.treasure = Some(cell);
        }

        if previous != current {
            if let Some(resource) = Resource::of(previous) {
                let _ = self.get_mut(resource).remove(&cell);
            }
        }

        match Resource::of(current) {
            Some(resource) => self.get_mut(resource).insert(cell),
            None => false,
        }
    }

    /// Drops `cell` from the index of `resource`.
    pub(crate) fn forget(&mut self, resource: Resource, cell: Coordinate) {
        let _ = self.get_mut(resource).remove(&cell);
    }
}
