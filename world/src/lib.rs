#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative belief state for the Isle Agent.
//!
//! The [`WorldModel`] is the only owner of persistent state: the belief map,
//! the discovered-resource indices, the inventory and the pose. Every mutation
//! goes through [`apply`]; systems read through the [`query`] module, and the
//! bridging search gets the narrow [`WorldModel::speculate`] capability for
//! trials that must leave no trace.

mod discoveries;
mod tiles;

use isle_agent_core::{
    Action, Capabilities, Command, Coordinate, Direction, Event, Item, Observation, Tile,
    TileMapView, ORIGIN, VIEW_REACH, WORKING_RADIUS,
};

pub use discoveries::Resource;

use discoveries::Discoveries;
use tiles::TileMap;

/// Largest working-window radius a configuration accepts.
pub const MAX_WORKING_RADIUS: i32 = 1024;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    working_radius: i32,
}

impl Config {
    /// Creates a configuration with the provided working-window radius.
    ///
    /// The radius is raised to at least the observation reach so the first
    /// observation always fits, and capped at [`MAX_WORKING_RADIUS`].
    #[must_use]
    pub const fn new(working_radius: i32) -> Self {
        let working_radius = if working_radius < VIEW_REACH {
            VIEW_REACH
        } else if working_radius > MAX_WORKING_RADIUS {
            MAX_WORKING_RADIUS
        } else {
            working_radius
        };
        Self { working_radius }
    }

    /// Half-width of the materialised working window.
    #[must_use]
    pub const fn working_radius(&self) -> i32 {
        self.working_radius
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(WORKING_RADIUS)
    }
}

/// Items and consumables carried by the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    has_axe: bool,
    has_key: bool,
    has_treasure: bool,
    bridge_resources: u32,
    rafts: u32,
}

impl Inventory {
    /// Whether an axe has been collected.
    #[must_use]
    pub const fn has_axe(&self) -> bool {
        self.has_axe
    }

    /// Whether a key has been collected.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.has_key
    }

    /// Whether the treasure is being carried.
    #[must_use]
    pub const fn has_treasure(&self) -> bool {
        self.has_treasure
    }

    /// Stepping stones available for bridging.
    #[must_use]
    pub const fn bridge_resources(&self) -> u32 {
        self.bridge_resources
    }

    /// Rafts gained from felled trees.
    #[must_use]
    pub const fn rafts(&self) -> u32 {
        self.rafts
    }

    /// Traversal permissions granted by the carried tools.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.has_key, self.has_axe)
    }
}

/// Position and facing of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pose {
    position: Coordinate,
    facing: Direction,
}

impl Pose {
    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Direction currently faced.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Cell directly ahead.
    #[must_use]
    pub const fn ahead(&self) -> Coordinate {
        self.position.step(self.facing)
    }
}

/// Represents the agent's belief about the world.
#[derive(Clone, Debug)]
pub struct WorldModel {
    tiles: TileMap,
    discoveries: Discoveries,
    inventory: Inventory,
    pose: Pose,
    move_count: u64,
}

impl WorldModel {
    /// Creates a world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an unexplored world with the agent at the origin facing north.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let mut world = Self {
            tiles: TileMap::new(config.working_radius()),
            discoveries: Discoveries::default(),
            inventory: Inventory::default(),
            pose: Pose {
                position: ORIGIN,
                facing: Direction::North,
            },
            move_count: 0,
        };
        world.stamp_player();
        world
    }

    /// Runs `trial` against a copy of the map where the water cells among
    /// `cells` are marked temporarily passable.
    ///
    /// Every marked cell is restored before this returns, whatever the trial
    /// concluded. Cells that are not currently water are left untouched, and
    /// the indices are never modified.
    pub fn speculate<R, F>(&mut self, cells: &[Coordinate], trial: F) -> R
    where
        F: FnOnce(&TileMapView<'_>) -> R,
    {
        let mut marked = Vec::with_capacity(cells.len());
        for &cell in cells {
            if self.tiles.get(cell) == Some(Tile::Water) {
                let _ = self.tiles.set(cell, Tile::TemporaryPassable);
                marked.push(cell);
            }
        }

        let result = trial(&self.tiles.view());

        for cell in marked {
            let _ = self.tiles.set(cell, Tile::Water);
        }

        result
    }

    fn replace_tile(&mut self, cell: Coordinate, tile: Tile) -> bool {
        let Some(previous) = self.tiles.set(cell, tile) else {
            return false;
        };
        self.discoveries.record(cell, previous, tile)
    }

    fn stamp_player(&mut self) {
        let _ = self.replace_tile(
            self.pose.position,
            Tile::PlayerFacing(self.pose.facing),
        );
    }

    fn observe(&mut self, observation: &Observation, out_events: &mut Vec<Event>) {
        let mut absolute = observation.clone();
        for _ in 0..self.pose.facing.quarter_turns() {
            absolute = absolute.rotated_clockwise();
        }

        let mut newly_indexed = 0;
        for (row, cells) in absolute.rows().enumerate() {
            for (column, tile) in cells.iter().copied().enumerate() {
                let cell = self
                    .pose
                    .position
                    .offset(view_offset(column), -view_offset(row));
                if cell == self.pose.position {
                    continue;
                }

                match self.tiles.get(cell) {
                    None | Some(Tile::TemporaryPassable) => continue,
                    Some(_) => {}
                }

                if self.replace_tile(cell, tile) {
                    newly_indexed += 1;
                }
            }
        }

        self.stamp_player();
        out_events.push(Event::Observed { newly_indexed });
    }

    fn perform(&mut self, action: Action, out_events: &mut Vec<Event>) {
        self.move_count = self.move_count.saturating_add(1);

        match action {
            Action::TurnLeft => {
                self.pose.facing = self.pose.facing.turn_left();
                out_events.push(Event::Turned {
                    facing: self.pose.facing,
                });
            }
            Action::TurnRight => {
                self.pose.facing = self.pose.facing.turn_right();
                out_events.push(Event::Turned {
                    facing: self.pose.facing,
                });
            }
            Action::Forward => self.advance(out_events),
            Action::Chop => {
                let ahead = self.pose.ahead();
                if self.tiles.tile(ahead) == Tile::Tree && self.inventory.has_axe {
                    self.fell_tree(ahead, out_events);
                }
            }
            Action::Unlock => {
                let ahead = self.pose.ahead();
                if self.tiles.tile(ahead) == Tile::Door && self.inventory.has_key {
                    let _ = self.replace_tile(ahead, Tile::Empty);
                    self.discoveries.forget(Resource::Door, ahead);
                    out_events.push(Event::DoorUnlocked { cell: ahead });
                }
            }
        }
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        let from = self.pose.position;
        let to = self.pose.ahead();

        match self.tiles.tile(to) {
            Tile::Tree if self.inventory.has_axe => self.fell_tree(to, out_events),
            tile @ (Tile::Water | Tile::TemporaryPassable) => {
                let consumed = self.inventory.bridge_resources > 0;
                if consumed {
                    self.inventory.bridge_resources -= 1;
                }
                // Open water without a stone stays water; the agent drowns.
                if consumed || tile == Tile::TemporaryPassable {
                    let _ = self.replace_tile(to, Tile::Bridged);
                    self.discoveries.forget(Resource::Water, to);
                    out_events.push(Event::BridgeCrossed { cell: to, consumed });
                }
            }
            tile => {
                if let Some(item) = tile.item() {
                    self.collect(item, to, out_events);
                }
            }
        }

        self.pose.position = to;
        out_events.push(Event::Advanced { from, to });
    }

    fn collect(&mut self, item: Item, cell: Coordinate, out_events: &mut Vec<Event>) {
        match item {
            Item::Axe => self.inventory.has_axe = true,
            Item::Key => self.inventory.has_key = true,
            Item::Treasure => self.inventory.has_treasure = true,
            Item::BridgeResource => {
                self.inventory.bridge_resources = self.inventory.bridge_resources.saturating_add(1);
            }
        }
        let _ = self.replace_tile(cell, Tile::Empty);
        out_events.push(Event::ItemCollected { item, cell });
    }

    fn fell_tree(&mut self, cell: Coordinate, out_events: &mut Vec<Event>) {
        let _ = self.replace_tile(cell, Tile::Empty);
        self.inventory.rafts = self.inventory.rafts.saturating_add(1);
        out_events.push(Event::TreeFelled { cell });
    }

    fn commit_bridge(&mut self, cells: Vec<Coordinate>, out_events: &mut Vec<Event>) {
        let committed: Vec<Coordinate> = cells
            .into_iter()
            .filter(|cell| self.tiles.get(*cell) == Some(Tile::Water))
            .collect();

        for &cell in &committed {
            let _ = self.replace_tile(cell, Tile::TemporaryPassable);
        }

        if !committed.is_empty() {
            out_events.push(Event::BridgeCommitted { cells: committed });
        }
    }
}

impl Default for WorldModel {
    fn default() -> Self {
        Self::new()
    }
}

fn view_offset(index: usize) -> i32 {
    i32::try_from(index).map_or(0, |value| value - VIEW_REACH)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut WorldModel, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Observe { observation } => world.observe(&observation, out_events),
        Command::Perform { action } => world.perform(action, out_events),
        Command::CommitBridge { cells } => world.commit_bridge(cells, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use super::{Inventory, Pose, Resource, WorldModel};
    use isle_agent_core::{Capabilities, Coordinate, Tile, TileMapView};

    /// Read-only view of the belief map for the planning systems.
    #[must_use]
    pub fn tile_view(world: &WorldModel) -> TileMapView<'_> {
        world.tiles.view()
    }

    /// Tile believed to occupy the coordinate.
    #[must_use]
    pub fn tile(world: &WorldModel, cell: Coordinate) -> Tile {
        world.tiles.tile(cell)
    }

    /// Current pose of the agent.
    #[must_use]
    pub fn pose(world: &WorldModel) -> Pose {
        world.pose
    }

    /// Items currently carried.
    #[must_use]
    pub fn inventory(world: &WorldModel) -> Inventory {
        world.inventory
    }

    /// Traversal permissions granted by the carried tools.
    #[must_use]
    pub fn capabilities(world: &WorldModel) -> Capabilities {
        world.inventory.capabilities()
    }

    /// Observed-but-uncollected cells of the given category, in coordinate order.
    #[must_use]
    pub fn discovered(world: &WorldModel, resource: Resource) -> &BTreeSet<Coordinate> {
        world.discoveries.get(resource)
    }

    /// Location of the treasure, fixed at its first sighting.
    #[must_use]
    pub fn treasure(world: &WorldModel) -> Option<Coordinate> {
        world.discoveries.treasure()
    }

    /// Number of actions applied so far.
    #[must_use]
    pub fn move_count(world: &WorldModel) -> u64 {
        world.move_count
    }

    /// Half-width of the materialised working window.
    #[must_use]
    pub fn working_radius(world: &WorldModel) -> i32 {
        world.tiles.radius()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(world: &mut WorldModel, rows: [&str; 5]) -> Vec<Event> {
        let mut events = Vec::new();
        let observation = Observation::parse(&rows).expect("valid observation");
        apply(world, Command::Observe { observation }, &mut events);
        events
    }

    fn perform(world: &mut WorldModel, action: Action) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Perform { action }, &mut events);
        events
    }

    #[test]
    fn new_world_starts_unknown_with_player_at_origin() {
        let world = WorldModel::with_config(Config::new(4));
        let pose = query::pose(&world);

        assert_eq!(pose.position(), ORIGIN);
        assert_eq!(pose.facing(), Direction::North);
        assert_eq!(query::tile(&world, ORIGIN), Tile::PlayerFacing(Direction::North));
        assert_eq!(query::tile(&world, Coordinate::new(1, 0)), Tile::Unknown);
        assert_eq!(query::move_count(&world), 0);
    }

    #[test]
    fn observation_facing_north_maps_rows_to_decreasing_y() {
        let mut world = WorldModel::with_config(Config::new(4));
        let events = observe(
            &mut world,
            ["a    ", "     ", "     ", "     ", "    k"],
        );

        assert_eq!(query::tile(&world, Coordinate::new(-2, 2)), Tile::Axe);
        assert_eq!(query::tile(&world, Coordinate::new(2, -2)), Tile::Key);
        assert!(query::discovered(&world, Resource::Axe).contains(&Coordinate::new(-2, 2)));
        assert_eq!(events, vec![Event::Observed { newly_indexed: 24 }]);
    }

    #[test]
    fn observation_facing_east_rotates_into_absolute_frame() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = perform(&mut world, Action::TurnRight);
        let _ = observe(
            &mut world,
            ["  $  ", "     ", "     ", "     ", "     "],
        );

        assert_eq!(query::tile(&world, Coordinate::new(2, 0)), Tile::Treasure);
        assert_eq!(query::treasure(&world), Some(Coordinate::new(2, 0)));
        assert_eq!(query::tile(&world, ORIGIN), Tile::PlayerFacing(Direction::East));
    }

    #[test]
    fn repeated_observation_does_not_reindex() {
        let mut world = WorldModel::with_config(Config::new(4));
        let rows = ["~~~~~", "     ", "     ", "     ", "     "];
        let _ = observe(&mut world, rows);
        let events = observe(&mut world, rows);

        assert_eq!(events, vec![Event::Observed { newly_indexed: 0 }]);
        assert_eq!(query::discovered(&world, Resource::Water).len(), 5);
    }

    #[test]
    fn committed_bridge_survives_reobservation() {
        let mut world = WorldModel::with_config(Config::new(4));
        let rows = ["     ", "  ~  ", "     ", "     ", "     "];
        let _ = observe(&mut world, rows);
        let water = Coordinate::new(0, 1);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitBridge { cells: vec![water] },
            &mut events,
        );
        assert_eq!(events, vec![Event::BridgeCommitted { cells: vec![water] }]);

        let _ = observe(&mut world, rows);
        assert_eq!(query::tile(&world, water), Tile::TemporaryPassable);
        assert!(!query::discovered(&world, Resource::Water).contains(&water));
    }

    #[test]
    fn speculation_restores_every_marked_cell() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", " ~~~ ", "     ", "     ", "     "],
        );
        let before = query::tile_view(&world).tiles().to_vec();
        let cells = [Coordinate::new(-1, 1), Coordinate::new(0, 1), Coordinate::new(5, 5)];

        let seen = world.speculate(&cells, |view| {
            (view.tile(cells[0]), view.tile(cells[1]), view.tile(Coordinate::new(1, 1)))
        });

        assert_eq!(
            seen,
            (Tile::TemporaryPassable, Tile::TemporaryPassable, Tile::Water)
        );
        assert_eq!(query::tile_view(&world).tiles(), before.as_slice());
    }

    #[test]
    fn walking_collects_items_and_clears_indices() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  o  ", "     ", "     ", "     "],
        );
        let stone = Coordinate::new(0, 1);

        let events = perform(&mut world, Action::Forward);

        assert_eq!(
            events,
            vec![
                Event::ItemCollected {
                    item: Item::BridgeResource,
                    cell: stone
                },
                Event::Advanced {
                    from: ORIGIN,
                    to: stone
                },
            ]
        );
        assert_eq!(query::inventory(&world).bridge_resources(), 1);
        assert!(query::discovered(&world, Resource::BridgeResource).is_empty());
        assert_eq!(query::pose(&world).position(), stone);
        assert_eq!(query::move_count(&world), 1);
    }

    #[test]
    fn crossing_a_committed_bridge_consumes_a_stone() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  ~  ", "     ", "  o  ", "     "],
        );
        let _ = perform(&mut world, Action::TurnRight);
        let _ = perform(&mut world, Action::TurnRight);
        let _ = perform(&mut world, Action::Forward);
        let _ = perform(&mut world, Action::TurnLeft);
        let _ = perform(&mut world, Action::TurnLeft);
        let water = Coordinate::new(0, 1);
        let mut commit_events = Vec::new();
        apply(
            &mut world,
            Command::CommitBridge { cells: vec![water] },
            &mut commit_events,
        );
        let _ = perform(&mut world, Action::Forward);
        let events = perform(&mut world, Action::Forward);

        assert!(events.contains(&Event::BridgeCrossed {
            cell: water,
            consumed: true
        }));
        assert_eq!(query::tile(&world, water), Tile::Bridged);
        assert_eq!(query::inventory(&world).bridge_resources(), 0);
    }

    #[test]
    fn chop_needs_an_axe() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  T  ", "     ", "     ", "     "],
        );

        assert!(perform(&mut world, Action::Chop).is_empty());
        assert_eq!(query::inventory(&world).rafts(), 0);
        assert_eq!(query::tile(&world, Coordinate::new(0, 1)), Tile::Tree);
    }

    #[test]
    fn unlock_without_key_or_door_is_a_no_op() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  -  ", "     ", "     ", "     "],
        );

        assert!(perform(&mut world, Action::Unlock).is_empty());
        let _ = perform(&mut world, Action::TurnLeft);
        assert!(perform(&mut world, Action::Unlock).is_empty());
        assert!(query::discovered(&world, Resource::Door).contains(&Coordinate::new(0, 1)));
    }

    #[test]
    fn key_opens_door_and_axe_fells_tree() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", " -ka ", "     ", "     ", "     "],
        );
        // Pick up the key at (0, 1) and the axe at (1, 1).
        let _ = perform(&mut world, Action::Forward);
        let _ = perform(&mut world, Action::TurnRight);
        let _ = perform(&mut world, Action::Forward);
        assert!(query::inventory(&world).has_key());
        assert!(query::inventory(&world).has_axe());

        let _ = perform(&mut world, Action::TurnLeft);
        let _ = perform(&mut world, Action::TurnLeft);
        let _ = perform(&mut world, Action::Forward);
        let unlock = perform(&mut world, Action::Unlock);
        assert_eq!(
            unlock,
            vec![Event::DoorUnlocked {
                cell: Coordinate::new(-1, 1)
            }]
        );
        assert!(query::discovered(&world, Resource::Door).is_empty());
    }

    #[test]
    fn small_radius_is_raised_to_view_reach() {
        assert_eq!(Config::new(0).working_radius(), 2);
        assert_eq!(Config::default().working_radius(), WORKING_RADIUS);
    }

    #[test]
    fn huge_radius_is_capped() {
        let config = Config::new(i32::MAX);
        assert_eq!(config.working_radius(), MAX_WORKING_RADIUS);

        let world = WorldModel::with_config(config);
        assert_eq!(query::working_radius(&world), MAX_WORKING_RADIUS);
        assert_eq!(
            query::tile(&world, Coordinate::new(MAX_WORKING_RADIUS, 0)),
            Tile::Unknown
        );
    }

    #[test]
    fn stepping_into_open_water_without_a_stone_leaves_it_water() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  ~  ", "     ", "     ", "     "],
        );
        let water = Coordinate::new(0, 1);

        let events = perform(&mut world, Action::Forward);

        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::BridgeCrossed { .. })));
        assert_eq!(query::tile(&world, water), Tile::Water);
        assert!(query::discovered(&world, Resource::Water).contains(&water));
        assert_eq!(query::pose(&world).position(), water);
    }

    #[test]
    fn committed_cell_becomes_bridged_even_without_a_stone() {
        let mut world = WorldModel::with_config(Config::new(4));
        let _ = observe(
            &mut world,
            ["     ", "  ~  ", "     ", "     ", "     "],
        );
        let water = Coordinate::new(0, 1);
        let mut commit_events = Vec::new();
        apply(
            &mut world,
            Command::CommitBridge { cells: vec![water] },
            &mut commit_events,
        );

        let events = perform(&mut world, Action::Forward);

        assert!(events.contains(&Event::BridgeCrossed {
            cell: water,
            consumed: false
        }));
        assert_eq!(query::tile(&world, water), Tile::Bridged);
    }
}
