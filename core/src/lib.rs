#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Isle Agent workspace.
//!
//! This crate defines the vocabulary that connects the transport adapters, the
//! authoritative belief state, and the pure planning systems. Adapters turn
//! wire bytes into validated [`Observation`] values, the world applies
//! [`Command`] values through its `apply` entry point and reports what changed
//! as [`Event`] values, and systems read the belief map exclusively through a
//! [`TileMapView`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-width of the square working window materialised by the belief map.
pub const WORKING_RADIUS: i32 = 80;

/// Edge length of the square observation window delivered every turn.
pub const VIEW_SIZE: usize = 5;

/// Distance from the centre of the observation window to its edge.
pub const VIEW_REACH: i32 = 2;

/// Number of tile symbols transmitted per observation (the centre is omitted).
pub const WIRE_CELLS: usize = VIEW_SIZE * VIEW_SIZE - 1;

/// Location where every episode begins and must end.
pub const ORIGIN: Coordinate = Coordinate::new(0, 0);

const VIEW_CENTRE: usize = VIEW_SIZE / 2;

/// Location of a single grid cell. `x` grows east and `y` grows north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Returns the orthogonal neighbour in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Orthogonal neighbours in the fixed order north, east, south, west.
    #[must_use]
    pub fn neighbors(self) -> [Coordinate; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of travel between two orthogonally adjacent coordinates.
    #[must_use]
    pub fn direction_to(self, other: Coordinate) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == other)
    }

    /// The 24 cells of the 5×5 look-around square centred on the coordinate,
    /// excluding the coordinate itself, in row-major order from the south-west.
    pub fn look_around(self) -> impl Iterator<Item = Coordinate> {
        (-VIEW_REACH..=VIEW_REACH)
            .flat_map(|dy| (-VIEW_REACH..=VIEW_REACH).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

/// Cardinal facing of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Facing toward increasing `y` ("up").
    North,
    /// Facing toward increasing `x` ("right").
    East,
    /// Facing toward decreasing `y` ("down").
    South,
    /// Facing toward decreasing `x` ("left").
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Direction reached after a 90° counter-clockwise turn.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Direction reached after a 90° clockwise turn.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Number of clockwise quarter turns separating north from this direction.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Unit displacement produced by one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Glyph used to draw the player while facing this direction.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::North => '^',
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
        }
    }
}

/// Inventory-derived permissions that gate traversal of doors and trees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Locked doors may be opened and crossed.
    pub has_key: bool,
    /// Trees may be felled and crossed.
    pub has_axe: bool,
}

impl Capabilities {
    /// Neither capability is held.
    pub const NONE: Self = Self::new(false, false);
    /// Both capabilities are held.
    pub const ALL: Self = Self::new(true, true);

    /// Creates a capability set from explicit flags.
    #[must_use]
    pub const fn new(has_key: bool, has_axe: bool) -> Self {
        Self { has_key, has_axe }
    }

    /// Same capabilities with the key granted.
    #[must_use]
    pub const fn with_key(self) -> Self {
        Self::new(true, self.has_axe)
    }

    /// Same capabilities with the axe granted.
    #[must_use]
    pub const fn with_axe(self) -> Self {
        Self::new(self.has_key, true)
    }
}

/// Collectable items that change the agent's inventory when entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    /// Tool that fells trees.
    Axe,
    /// Tool that opens locked doors.
    Key,
    /// Consumable stepping stone that bridges one water cell.
    BridgeResource,
    /// The goal item that must be carried back to the origin.
    Treasure,
}

/// Contents of a single belief-map cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Never observed.
    #[default]
    Unknown,
    /// Outside the playable map.
    Boundary,
    /// Solid wall.
    Wall,
    /// Open ground.
    Empty,
    /// Water that cannot be entered without a bridge.
    Water,
    /// Water committed for bridging but not yet walked.
    TemporaryPassable,
    /// Water already bridged by a placed stepping stone.
    Bridged,
    /// Locked door.
    Door,
    /// Tree blocking the way.
    Tree,
    /// Axe lying on the ground.
    Axe,
    /// Key lying on the ground.
    Key,
    /// Uncollected stepping stone.
    BridgeResource,
    /// The treasure.
    Treasure,
    /// The agent itself, drawn on its own cell.
    PlayerFacing(Direction),
}

impl Tile {
    /// Symbol used for the tile on the wire and in debug renders.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Unknown => '?',
            Self::Boundary => '.',
            Self::Wall => '*',
            Self::Empty => ' ',
            Self::Water => '~',
            Self::TemporaryPassable => '#',
            Self::Bridged => 'O',
            Self::Door => '-',
            Self::Tree => 'T',
            Self::Axe => 'a',
            Self::Key => 'k',
            Self::BridgeResource => 'o',
            Self::Treasure => '$',
            Self::PlayerFacing(direction) => direction.glyph(),
        }
    }

    /// Decodes a tile from its symbol.
    pub fn from_symbol(symbol: char) -> Result<Self, SymbolError> {
        let tile = match symbol {
            '?' => Self::Unknown,
            '.' => Self::Boundary,
            '*' => Self::Wall,
            ' ' => Self::Empty,
            '~' => Self::Water,
            '#' => Self::TemporaryPassable,
            'O' => Self::Bridged,
            '-' => Self::Door,
            'T' => Self::Tree,
            'a' => Self::Axe,
            'k' => Self::Key,
            'o' => Self::BridgeResource,
            '$' => Self::Treasure,
            '^' => Self::PlayerFacing(Direction::North),
            '>' => Self::PlayerFacing(Direction::East),
            'v' => Self::PlayerFacing(Direction::South),
            '<' => Self::PlayerFacing(Direction::West),
            other => return Err(SymbolError::UnknownTile(other)),
        };
        Ok(tile)
    }

    /// Single source of truth for traversability under the given capabilities.
    #[must_use]
    pub const fn is_passable(self, capabilities: Capabilities) -> bool {
        match self {
            Self::Unknown | Self::Boundary | Self::Wall | Self::Water => false,
            Self::Door => capabilities.has_key,
            Self::Tree => capabilities.has_axe,
            Self::Empty
            | Self::TemporaryPassable
            | Self::Bridged
            | Self::Axe
            | Self::Key
            | Self::BridgeResource
            | Self::Treasure
            | Self::PlayerFacing(_) => true,
        }
    }

    /// Item collected by entering the tile, if any.
    #[must_use]
    pub const fn item(self) -> Option<Item> {
        match self {
            Self::Axe => Some(Item::Axe),
            Self::Key => Some(Item::Key),
            Self::BridgeResource => Some(Item::BridgeResource),
            Self::Treasure => Some(Item::Treasure),
            _ => None,
        }
    }

    /// Reports whether the tile only exists inside the belief map.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::Unknown | Self::TemporaryPassable | Self::PlayerFacing(_)
        )
    }
}

/// Primitive action emitted once per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step onto the tile ahead.
    Forward,
    /// Rotate 90° counter-clockwise in place.
    TurnLeft,
    /// Rotate 90° clockwise in place.
    TurnRight,
    /// Fell the tree ahead.
    Chop,
    /// Open the door ahead.
    Unlock,
}

impl Action {
    /// Wire symbol of the action.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Forward => 'F',
            Self::TurnLeft => 'L',
            Self::TurnRight => 'R',
            Self::Chop => 'C',
            Self::Unlock => 'U',
        }
    }

    /// Decodes an action from its wire symbol, accepting either case.
    pub fn from_symbol(symbol: char) -> Result<Self, SymbolError> {
        match symbol.to_ascii_uppercase() {
            'F' => Ok(Self::Forward),
            'L' => Ok(Self::TurnLeft),
            'R' => Ok(Self::TurnRight),
            'C' => Ok(Self::Chop),
            'U' => Ok(Self::Unlock),
            _ => Err(SymbolError::UnknownAction(symbol)),
        }
    }
}

/// Failures raised while decoding individual symbols.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The character does not name any tile.
    #[error("unknown tile symbol {0:?}")]
    UnknownTile(char),
    /// The character does not name any action.
    #[error("unknown action symbol {0:?}")]
    UnknownAction(char),
}

/// Reasons an observation is rejected before it can reach the belief map.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ObservationError {
    /// The window has the wrong number of rows.
    #[error("observation has {found} rows, expected {expected}")]
    RowCount {
        /// Number of rows required.
        expected: usize,
        /// Number of rows supplied.
        found: usize,
    },
    /// One row of the window has the wrong length.
    #[error("observation row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Index of the offending row.
        row: usize,
        /// Number of cells required.
        expected: usize,
        /// Number of cells supplied.
        found: usize,
    },
    /// The wire payload has the wrong number of bytes.
    #[error("observation payload has {found} cells, expected {expected}")]
    WireLength {
        /// Number of cells required.
        expected: usize,
        /// Number of cells supplied.
        found: usize,
    },
    /// A cell carries an undecodable symbol.
    #[error("observation cell ({row}, {column}) is invalid: {source}")]
    Symbol {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
        /// Decoding failure.
        #[source]
        source: SymbolError,
    },
    /// A cell carries a tile that only exists inside the belief map.
    #[error("observation cell ({row}, {column}) holds internal tile {tile:?}")]
    InternalTile {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
        /// Tile that was supplied.
        tile: Tile,
    },
}

/// Validated 5×5 window in player-relative orientation; row 0 lies ahead.
///
/// The centre cell always holds `PlayerFacing(North)` because the agent faces
/// "up" in its own frame of reference. Whatever the sender placed there is
/// ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    cells: [[Tile; VIEW_SIZE]; VIEW_SIZE],
}

impl Observation {
    /// Builds an observation from rows of tiles.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ObservationError>
    where
        R: AsRef<[Tile]>,
    {
        if rows.len() != VIEW_SIZE {
            return Err(ObservationError::RowCount {
                expected: VIEW_SIZE,
                found: rows.len(),
            });
        }

        let mut cells = [[Tile::Empty; VIEW_SIZE]; VIEW_SIZE];
        for (row, source) in rows.iter().enumerate() {
            let source = source.as_ref();
            if source.len() != VIEW_SIZE {
                return Err(ObservationError::RowLength {
                    row,
                    expected: VIEW_SIZE,
                    found: source.len(),
                });
            }
            for (column, tile) in source.iter().copied().enumerate() {
                if is_centre(row, column) {
                    continue;
                }
                if tile.is_internal() {
                    return Err(ObservationError::InternalTile { row, column, tile });
                }
                cells[row][column] = tile;
            }
        }

        cells[VIEW_CENTRE][VIEW_CENTRE] = Tile::PlayerFacing(Direction::North);
        Ok(Self { cells })
    }

    /// Parses an observation from rows of tile symbols.
    pub fn parse<S>(rows: &[S]) -> Result<Self, ObservationError>
    where
        S: AsRef<str>,
    {
        if rows.len() != VIEW_SIZE {
            return Err(ObservationError::RowCount {
                expected: VIEW_SIZE,
                found: rows.len(),
            });
        }

        let mut tiles = Vec::with_capacity(VIEW_SIZE);
        for (row, line) in rows.iter().enumerate() {
            let mut decoded = Vec::with_capacity(VIEW_SIZE);
            for (column, symbol) in line.as_ref().chars().enumerate() {
                if is_centre(row, column) {
                    decoded.push(Tile::Empty);
                    continue;
                }
                let tile = Tile::from_symbol(symbol).map_err(|source| ObservationError::Symbol {
                    row,
                    column,
                    source,
                })?;
                decoded.push(tile);
            }
            tiles.push(decoded);
        }

        Self::from_rows(&tiles)
    }

    /// Decodes the wire layout: row-major symbols with the centre omitted.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, ObservationError> {
        if bytes.len() != WIRE_CELLS {
            return Err(ObservationError::WireLength {
                expected: WIRE_CELLS,
                found: bytes.len(),
            });
        }

        let mut symbols = bytes.iter().map(|byte| char::from(*byte));
        let mut rows = vec![String::with_capacity(VIEW_SIZE); VIEW_SIZE];
        for (row, line) in rows.iter_mut().enumerate() {
            for column in 0..VIEW_SIZE {
                if is_centre(row, column) {
                    line.push(' ');
                } else if let Some(symbol) = symbols.next() {
                    line.push(symbol);
                }
            }
        }

        Self::parse(&rows)
    }

    /// Tile at the provided window position.
    #[must_use]
    pub fn tile(&self, row: usize, column: usize) -> Option<Tile> {
        self.cells.get(row).and_then(|cells| cells.get(column)).copied()
    }

    /// Iterator over the window rows, nearest-ahead row first.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile; VIEW_SIZE]> {
        self.cells.iter()
    }

    /// Renders every row back into its symbols.
    #[must_use]
    pub fn to_symbol_rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|tile| tile.symbol()).collect())
            .collect()
    }

    /// Returns the window rotated by one clockwise quarter turn.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut cells = [[Tile::Empty; VIEW_SIZE]; VIEW_SIZE];
        for (row, source) in self.cells.iter().enumerate() {
            for (column, tile) in source.iter().enumerate() {
                cells[column][VIEW_SIZE - 1 - row] = *tile;
            }
        }
        Self { cells }
    }
}

fn is_centre(row: usize, column: usize) -> bool {
    row == VIEW_CENTRE && column == VIEW_CENTRE
}

/// Commands that express every permissible belief-state mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Merges a freshly received observation into the belief map.
    Observe {
        /// Window observed this turn.
        observation: Observation,
    },
    /// Mirrors an action that is about to be sent to the environment.
    Perform {
        /// Action being committed.
        action: Action,
    },
    /// Commits water cells chosen by the bridging search as passable.
    CommitBridge {
        /// Water cells to mark as temporarily passable.
        cells: Vec<Coordinate>,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An observation was merged.
    Observed {
        /// Number of coordinates added to the discovered-resource indices.
        newly_indexed: usize,
    },
    /// The agent rotated in place.
    Turned {
        /// Facing after the turn.
        facing: Direction,
    },
    /// The agent moved one cell.
    Advanced {
        /// Cell occupied before the move.
        from: Coordinate,
        /// Cell occupied after the move.
        to: Coordinate,
    },
    /// An item was picked up.
    ItemCollected {
        /// Kind of item collected.
        item: Item,
        /// Cell the item was lying on.
        cell: Coordinate,
    },
    /// A tree was felled and turned into a raft.
    TreeFelled {
        /// Cell the tree occupied.
        cell: Coordinate,
    },
    /// A locked door was opened.
    DoorUnlocked {
        /// Cell the door occupies.
        cell: Coordinate,
    },
    /// A water cell was entered on a bridge.
    BridgeCrossed {
        /// Cell that became permanently bridged.
        cell: Coordinate,
        /// Whether a stepping stone was taken from the inventory.
        consumed: bool,
    },
    /// Water cells were committed as temporarily passable.
    BridgeCommitted {
        /// Cells that were converted.
        cells: Vec<Coordinate>,
    },
}

/// Number of cells along one edge of a working window with the given radius.
#[must_use]
pub fn window_side(radius: i32) -> usize {
    usize::try_from(radius.max(0))
        .ok()
        .and_then(|radius| radius.checked_mul(2))
        .and_then(|diameter| diameter.checked_add(1))
        .unwrap_or(1)
}

/// Read-only view into the dense belief map.
///
/// Cells are stored row-major from the south-west corner `(-radius, -radius)`.
/// Coordinates outside the window read as [`Tile::Unknown`].
#[derive(Clone, Debug)]
pub struct TileMapView<'a> {
    tiles: Cow<'a, [Tile]>,
    radius: i32,
}

impl<'a> TileMapView<'a> {
    /// Captures a view backed by the provided cell slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], radius: i32) -> Self {
        Self {
            tiles: Cow::Borrowed(tiles),
            radius,
        }
    }

    /// Creates a view that owns its cells.
    #[must_use]
    pub fn from_owned(tiles: Vec<Tile>, radius: i32) -> TileMapView<'static> {
        TileMapView {
            tiles: Cow::Owned(tiles),
            radius,
        }
    }

    /// Builds an owned view from ASCII rows.
    ///
    /// The first character of the first row lands on `north_west`; each
    /// following row lies one step further south. Every cell not covered by a
    /// row stays [`Tile::Unknown`].
    pub fn from_ascii<S>(
        radius: i32,
        north_west: Coordinate,
        rows: &[S],
    ) -> Result<TileMapView<'static>, SymbolError>
    where
        S: AsRef<str>,
    {
        let side = window_side(radius);
        let mut view = TileMapView::from_owned(vec![Tile::Unknown; side * side], radius);
        for (row, line) in rows.iter().enumerate() {
            let dy = i32::try_from(row).unwrap_or(i32::MAX);
            for (column, symbol) in line.as_ref().chars().enumerate() {
                let dx = i32::try_from(column).unwrap_or(i32::MAX);
                let tile = Tile::from_symbol(symbol)?;
                let cell = north_west.offset(dx, -dy);
                if let Some(index) = view.index(cell) {
                    view.tiles.to_mut()[index] = tile;
                }
            }
        }
        Ok(view)
    }

    /// Half-width of the window.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// Number of cells in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Dense cells in storage order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reports whether the coordinate lies inside the window.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        self.index(cell).is_some()
    }

    /// Storage offset of the coordinate, if it lies inside the window.
    #[must_use]
    pub fn index(&self, cell: Coordinate) -> Option<usize> {
        window_index(self.radius, cell).filter(|index| *index < self.tiles.len())
    }

    /// Coordinate stored at the provided offset.
    #[must_use]
    pub fn coordinate(&self, index: usize) -> Option<Coordinate> {
        if index >= self.tiles.len() {
            return None;
        }
        let side = window_side(self.radius);
        let column = i32::try_from(index % side).ok()?;
        let row = i32::try_from(index / side).ok()?;
        Some(Coordinate::new(column - self.radius, row - self.radius))
    }

    /// Tile stored at the coordinate.
    #[must_use]
    pub fn tile(&self, cell: Coordinate) -> Tile {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(Tile::Unknown)
    }

    /// Reports whether the coordinate can be entered with the capabilities.
    #[must_use]
    pub fn is_passable(&self, cell: Coordinate, capabilities: Capabilities) -> bool {
        self.tile(cell).is_passable(capabilities)
    }
}

/// Storage offset of a coordinate within a window of the given radius.
#[must_use]
pub fn window_index(radius: i32, cell: Coordinate) -> Option<usize> {
    if radius < 0
        || cell.x().unsigned_abs() > radius.unsigned_abs()
        || cell.y().unsigned_abs() > radius.unsigned_abs()
    {
        return None;
    }
    let side = window_side(radius);
    let column = usize::try_from(cell.x() + radius).ok()?;
    let row = usize::try_from(cell.y() + radius).ok()?;
    row.checked_mul(side)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn player_facing_tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::PlayerFacing(Direction::West));
        assert_round_trip(&Coordinate::new(-3, 17));
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Coordinate::new(-1, 1);
        let destination = Coordinate::new(3, -2);
        assert_eq!(origin.manhattan_distance(destination), 7);
        assert_eq!(destination.manhattan_distance(origin), 7);
    }

    #[test]
    fn turning_wraps_around() {
        let mut facing = Direction::North;
        for _ in 0..4 {
            facing = facing.turn_right();
        }
        assert_eq!(facing, Direction::North);
        assert_eq!(Direction::North.turn_left(), Direction::West);
        assert_eq!(Direction::West.turn_right(), Direction::North);
    }

    #[test]
    fn direction_to_only_accepts_neighbours() {
        let cell = Coordinate::new(2, 2);
        assert_eq!(cell.direction_to(Coordinate::new(2, 3)), Some(Direction::North));
        assert_eq!(cell.direction_to(Coordinate::new(3, 2)), Some(Direction::East));
        assert_eq!(cell.direction_to(Coordinate::new(2, 1)), Some(Direction::South));
        assert_eq!(cell.direction_to(Coordinate::new(1, 2)), Some(Direction::West));
        assert_eq!(cell.direction_to(Coordinate::new(3, 3)), None);
        assert_eq!(cell.direction_to(cell), None);
    }

    #[test]
    fn look_around_covers_twenty_four_cells() {
        let centre = Coordinate::new(5, -5);
        let ring: Vec<_> = centre.look_around().collect();
        assert_eq!(ring.len(), 24);
        assert!(!ring.contains(&centre));
        assert!(ring.iter().all(|cell| cell.x().abs_diff(5) <= 2 && cell.y().abs_diff(-5) <= 2));
    }

    #[test]
    fn passability_respects_capabilities() {
        assert!(!Tile::Door.is_passable(Capabilities::NONE));
        assert!(Tile::Door.is_passable(Capabilities::NONE.with_key()));
        assert!(!Tile::Tree.is_passable(Capabilities::NONE.with_key()));
        assert!(Tile::Tree.is_passable(Capabilities::NONE.with_axe()));
        assert!(!Tile::Water.is_passable(Capabilities::ALL));
        assert!(!Tile::Unknown.is_passable(Capabilities::ALL));
        assert!(Tile::TemporaryPassable.is_passable(Capabilities::NONE));
        assert!(Tile::PlayerFacing(Direction::South).is_passable(Capabilities::NONE));
    }

    #[test]
    fn tile_symbols_decode_back() {
        for symbol in ['.', '*', ' ', '~', '#', 'O', '-', 'T', 'a', 'k', 'o', '$', '^', '<'] {
            let tile = Tile::from_symbol(symbol).expect("known symbol");
            assert_eq!(tile.symbol(), symbol);
        }
        assert_eq!(Tile::from_symbol('x'), Err(SymbolError::UnknownTile('x')));
    }

    #[test]
    fn action_symbols_accept_lowercase() {
        assert_eq!(Action::from_symbol('f'), Ok(Action::Forward));
        assert_eq!(Action::from_symbol('U'), Ok(Action::Unlock));
        assert!(Action::from_symbol('B').is_err());
    }

    #[test]
    fn observation_rejects_wrong_shapes() {
        let short = ["     "; 4];
        assert_eq!(
            Observation::parse(&short),
            Err(ObservationError::RowCount {
                expected: 5,
                found: 4
            })
        );

        let ragged = ["     ", "     ", "    ", "     ", "     "];
        assert_eq!(
            Observation::parse(&ragged),
            Err(ObservationError::RowLength {
                row: 2,
                expected: 5,
                found: 4
            })
        );

        assert!(matches!(
            Observation::from_wire(&[b' '; 23]),
            Err(ObservationError::WireLength { found: 23, .. })
        ));
    }

    #[test]
    fn observation_rejects_internal_tiles() {
        let rows = ["  #  ", "     ", "     ", "     ", "     "];
        assert_eq!(
            Observation::parse(&rows),
            Err(ObservationError::InternalTile {
                row: 0,
                column: 2,
                tile: Tile::TemporaryPassable
            })
        );
    }

    #[test]
    fn observation_ignores_centre_and_decodes_wire() {
        let mut wire = [b' '; WIRE_CELLS];
        wire[0] = b'~';
        wire[12] = b'$';
        let observation = Observation::from_wire(&wire).expect("valid payload");

        assert_eq!(observation.tile(0, 0), Some(Tile::Water));
        assert_eq!(observation.tile(2, 2), Some(Tile::PlayerFacing(Direction::North)));
        assert_eq!(observation.tile(2, 3), Some(Tile::Treasure));
    }

    #[test]
    fn rotation_moves_ahead_row_to_east_column() {
        let rows = ["aaaaa", "     ", "     ", "     ", "     "];
        let observation = Observation::parse(&rows).expect("valid rows");
        let rotated = observation.rotated_clockwise();
        for row in 0..VIEW_SIZE {
            assert_eq!(rotated.tile(row, VIEW_SIZE - 1), Some(Tile::Axe));
        }
    }

    #[test]
    fn view_indexing_round_trips_coordinates() {
        let view = TileMapView::from_owned(vec![Tile::Unknown; 9], 1);
        for index in 0..9 {
            let cell = view.coordinate(index).expect("in range");
            assert_eq!(view.index(cell), Some(index));
        }
        assert_eq!(view.index(Coordinate::new(2, 0)), None);
        assert_eq!(view.tile(Coordinate::new(-5, 0)), Tile::Unknown);
    }

    #[test]
    fn ascii_rows_land_with_north_on_top() {
        let view = TileMapView::from_ascii(3, Coordinate::new(-1, 1), &["a~k", " T ", "$*o"])
            .expect("valid symbols");
        assert_eq!(view.tile(Coordinate::new(-1, 1)), Tile::Axe);
        assert_eq!(view.tile(Coordinate::new(1, 1)), Tile::Key);
        assert_eq!(view.tile(Coordinate::new(0, 0)), Tile::Tree);
        assert_eq!(view.tile(Coordinate::new(-1, -1)), Tile::Treasure);
        assert_eq!(view.tile(Coordinate::new(2, 2)), Tile::Unknown);
    }
}
