#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first reachability queries over the belief map.
//!
//! Only a yes/no answer is produced, which is cheaper than building and
//! discarding a full path. The answer always agrees with the pathfinding
//! system for identical inputs because both consult
//! [`TileMapView::is_passable`] and require the start and goal cells to be
//! passable.

use std::collections::VecDeque;

use isle_agent_core::{Capabilities, Coordinate, TileMapView};

/// Set of cells connected to a start cell through passable terrain.
#[derive(Clone, Debug)]
pub struct ReachableRegion {
    radius: i32,
    visited: Vec<bool>,
    len: usize,
}

impl ReachableRegion {
    /// Reports whether the cell belongs to the region.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        isle_agent_core::window_index(self.radius, cell)
            .and_then(|index| self.visited.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of cells in the region.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether nothing is reachable, which happens when the start
    /// cell itself is impassable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Reports whether `goal` can be reached from `start` through passable cells.
#[must_use]
pub fn can_reach(
    view: &TileMapView<'_>,
    start: Coordinate,
    goal: Coordinate,
    capabilities: Capabilities,
) -> bool {
    if !view.is_passable(goal, capabilities) {
        return false;
    }

    flood(view, start, capabilities, Some(goal)).contains(goal)
}

/// Floods outward from `start` and returns every reachable cell.
#[must_use]
pub fn reachable_region(
    view: &TileMapView<'_>,
    start: Coordinate,
    capabilities: Capabilities,
) -> ReachableRegion {
    flood(view, start, capabilities, None)
}

fn flood(
    view: &TileMapView<'_>,
    start: Coordinate,
    capabilities: Capabilities,
    stop_at: Option<Coordinate>,
) -> ReachableRegion {
    let mut region = ReachableRegion {
        radius: view.radius(),
        visited: vec![false; view.len()],
        len: 0,
    };

    let Some(start_index) = view.index(start) else {
        return region;
    };
    if !view.is_passable(start, capabilities) {
        return region;
    }

    region.visited[start_index] = true;
    region.len = 1;
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if Some(cell) == stop_at {
            break;
        }

        for neighbor in cell.neighbors() {
            let Some(index) = view.index(neighbor) else {
                continue;
            };
            if region.visited[index] || !view.is_passable(neighbor, capabilities) {
                continue;
            }

            region.visited[index] = true;
            region.len += 1;
            queue.push_back(neighbor);
        }
    }

    region
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(rows: &[&str]) -> TileMapView<'static> {
        TileMapView::from_ascii(4, Coordinate::new(-2, 2), rows).expect("valid rows")
    }

    #[test]
    fn open_ground_is_reachable() {
        let view = view(&["     ", "     ", "     "]);
        assert!(can_reach(
            &view,
            Coordinate::new(-2, 2),
            Coordinate::new(2, 0),
            Capabilities::NONE
        ));
    }

    #[test]
    fn walls_split_regions() {
        let view = view(&["  *  ", "  *  ", "  *  "]);
        let region = reachable_region(&view, Coordinate::new(-2, 1), Capabilities::NONE);

        assert_eq!(region.len(), 6);
        assert!(region.contains(Coordinate::new(-1, 0)));
        assert!(!region.contains(Coordinate::new(1, 0)));
    }

    #[test]
    fn doors_open_only_with_key() {
        let view = view(&["  -  "]);
        let start = Coordinate::new(-2, 2);
        let goal = Coordinate::new(2, 2);

        assert!(!can_reach(&view, start, goal, Capabilities::NONE));
        assert!(can_reach(&view, start, goal, Capabilities::NONE.with_key()));
    }

    #[test]
    fn impassable_start_reaches_nothing() {
        let view = view(&["~    "]);
        let region = reachable_region(&view, Coordinate::new(-2, 2), Capabilities::ALL);
        assert!(region.is_empty());
        assert!(!can_reach(
            &view,
            Coordinate::new(-2, 2),
            Coordinate::new(-1, 2),
            Capabilities::ALL
        ));
    }

    #[test]
    fn impassable_goal_is_never_reached() {
        let view = view(&["  T  "]);
        assert!(!can_reach(
            &view,
            Coordinate::new(-2, 2),
            Coordinate::new(0, 2),
            Capabilities::NONE
        ));
        assert!(can_reach(
            &view,
            Coordinate::new(-2, 2),
            Coordinate::new(0, 2),
            Capabilities::NONE.with_axe()
        ));
    }
}
