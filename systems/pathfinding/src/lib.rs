#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Capability-gated shortest-path search over the belief map.
//!
//! [`search`] runs A* on the 4-connected grid with a Manhattan heuristic,
//! which is admissible and consistent for unit-cost moves, so returned paths
//! are shortest. Open-set ties are broken by insertion order, keeping results
//! reproducible across runs.

use std::{cmp::Ordering, collections::BinaryHeap};

use isle_agent_core::{Capabilities, Coordinate, TileMapView};

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    cell: Coordinate,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u64) {
        (self.f, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the smallest key first.
        other.key().cmp(&self.key())
    }
}

/// Finds a shortest path from `start` to `goal`, both inclusive.
///
/// Returns `None` when no route exists with the given capabilities, including
/// when either endpoint is impassable or outside the working window. That is
/// an ordinary outcome for callers, not an error.
#[must_use]
pub fn search(
    view: &TileMapView<'_>,
    start: Coordinate,
    goal: Coordinate,
    capabilities: Capabilities,
) -> Option<Vec<Coordinate>> {
    let start_index = view.index(start)?;
    let goal_index = view.index(goal)?;
    if !view.is_passable(start, capabilities) || !view.is_passable(goal, capabilities) {
        return None;
    }

    let mut g_score = vec![u32::MAX; view.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; view.len()];
    let mut open = BinaryHeap::new();
    let mut tie: u64 = 0;

    g_score[start_index] = 0;
    open.push(OpenNode {
        f: start.manhattan_distance(goal),
        g: 0,
        cell: start,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        if node.cell == goal {
            return Some(reconstruct_path(view, &came_from, goal_index));
        }

        let Some(node_index) = view.index(node.cell) else {
            continue;
        };
        if node.g != g_score[node_index] {
            // Stale heap entry.
            continue;
        }

        for neighbor in node.cell.neighbors() {
            let Some(neighbor_index) = view.index(neighbor) else {
                continue;
            };
            if !view.is_passable(neighbor, capabilities) {
                continue;
            }

            let tentative = node.g.saturating_add(1);
            if tentative >= g_score[neighbor_index] {
                continue;
            }

            came_from[neighbor_index] = Some(node_index);
            g_score[neighbor_index] = tentative;
            open.push(OpenNode {
                f: tentative.saturating_add(neighbor.manhattan_distance(goal)),
                g: tentative,
                cell: neighbor,
                tie,
            });
            tie += 1;
        }
    }

    None
}

fn reconstruct_path(
    view: &TileMapView<'_>,
    came_from: &[Option<usize>],
    mut current: usize,
) -> Vec<Coordinate> {
    let mut indices = vec![current];
    while let Some(previous) = came_from[current] {
        current = previous;
        indices.push(current);
    }
    indices.reverse();
    indices
        .into_iter()
        .filter_map(|index| view.coordinate(index))
        .collect()
}
