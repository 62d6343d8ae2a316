#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Minimal bridge selection over discovered water.
//!
//! Candidate subsets of the water index are enumerated in increasing size.
//! Each contiguous subset is trialled through [`WorldModel::speculate`], so no
//! trial ever survives the search. Only the winning subset is written back,
//! and only through [`Command::CommitBridge`].

use isle_agent_core::{Command, Coordinate, Event};
use isle_agent_system_reachability::can_reach;
use isle_agent_world::{apply, query, Resource, WorldModel};
use tracing::debug;

/// Goal of a bridging search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeRequest {
    target: Coordinate,
    budget: u32,
    anchors: Vec<Coordinate>,
}

impl BridgeRequest {
    /// Requests a bridge of at most `budget` cells that makes `target`
    /// reachable from the agent's position.
    #[must_use]
    pub fn new(target: Coordinate, budget: u32) -> Self {
        Self {
            target,
            budget,
            anchors: Vec::new(),
        }
    }

    /// Scores candidate bridges by their distance to `anchors` instead of to
    /// the target.
    #[must_use]
    pub fn with_anchors(mut self, anchors: Vec<Coordinate>) -> Self {
        self.anchors = anchors;
        self
    }

    /// Cell that must become reachable.
    #[must_use]
    pub fn target(&self) -> Coordinate {
        self.target
    }

    /// Largest bridge that may be built.
    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Cells the cost function measures against.
    #[must_use]
    pub fn anchors(&self) -> &[Coordinate] {
        if self.anchors.is_empty() {
            std::slice::from_ref(&self.target)
        } else {
            &self.anchors
        }
    }

    fn cost(&self, cells: &[Coordinate]) -> u32 {
        let anchors = self.anchors();
        cells
            .iter()
            .map(|cell| {
                anchors
                    .iter()
                    .map(|anchor| cell.manhattan_distance(*anchor))
                    .min()
                    .unwrap_or(0)
            })
            .fold(0, u32::saturating_add)
    }
}

/// Water cells selected for bridging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgePlan {
    cells: Vec<Coordinate>,
    cost: u32,
}

impl BridgePlan {
    /// Cells in lexicographic coordinate order.
    #[must_use]
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    /// Summed anchor distance of the cells.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

/// Size-`k` subsets of a slice, produced in lexicographic index order.
#[derive(Clone, Debug)]
pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a, T> Combinations<'a, T> {
    /// Creates the enumeration. A size of zero or larger than the slice
    /// yields nothing.
    #[must_use]
    pub fn new(items: &'a [T], size: usize) -> Self {
        Self {
            items,
            indices: (0..size).collect(),
            exhausted: size == 0 || size > items.len(),
        }
    }

    fn advance(&mut self) {
        let size = self.indices.len();
        let len = self.items.len();

        let Some(pivot) = (0..size)
            .rev()
            .find(|&position| self.indices[position] < len - size + position)
        else {
            self.exhausted = true;
            return;
        };

        self.indices[pivot] += 1;
        for position in pivot + 1..size {
            self.indices[position] = self.indices[position - 1] + 1;
        }
    }
}

impl<T: Copy> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let current = self.indices.iter().map(|&index| self.items[index]).collect();
        self.advance();
        Some(current)
    }
}

/// Reports whether the cells form one orthogonally connected group.
#[must_use]
pub fn is_contiguous(cells: &[Coordinate]) -> bool {
    let Some(&first) = cells.first() else {
        return false;
    };

    let mut visited = vec![false; cells.len()];
    visited[0] = true;
    let mut stack = vec![first];
    let mut seen = 1;

    while let Some(cell) = stack.pop() {
        for (index, other) in cells.iter().enumerate() {
            if !visited[index] && cell.manhattan_distance(*other) == 1 {
                visited[index] = true;
                seen += 1;
                stack.push(*other);
            }
        }
    }

    seen == cells.len()
}

/// Finds the smallest contiguous set of water cells that makes the target
/// reachable, without changing the world.
///
/// Among equally small sets the one closest to the anchors wins, with ties
/// kept in enumeration order. Returns `None` when the budget is zero or no
/// set within the budget works.
///
/// The enumeration is combinatorial in the size of the water index, so large
/// lakes with large budgets are expensive.
#[must_use]
pub fn search(world: &mut WorldModel, request: &BridgeRequest) -> Option<BridgePlan> {
    let water: Vec<Coordinate> = query::discovered(world, Resource::Water)
        .iter()
        .copied()
        .collect();
    let start = query::pose(world).position();
    let capabilities = query::capabilities(world);
    let largest = usize::try_from(request.budget)
        .unwrap_or(usize::MAX)
        .min(water.len());

    for size in 1..=largest {
        let mut best: Option<BridgePlan> = None;

        for cells in Combinations::new(&water, size) {
            if !is_contiguous(&cells) {
                continue;
            }

            let opens_route = world.speculate(&cells, |view| {
                can_reach(view, start, request.target, capabilities)
            });
            if !opens_route {
                continue;
            }

            let cost = request.cost(&cells);
            if best.as_ref().map_or(true, |plan| cost < plan.cost) {
                best = Some(BridgePlan { cells, cost });
            }
        }

        if best.is_some() {
            return best;
        }
    }

    None
}

/// Runs [`search`] and commits the winning cells as temporarily passable.
///
/// Nothing is committed when the search fails.
pub fn search_and_commit(
    world: &mut WorldModel,
    request: &BridgeRequest,
    out_events: &mut Vec<Event>,
) -> Option<BridgePlan> {
    let plan = search(world, request)?;
    debug!(
        "committing bridge of {} cells towards {:?}: {:?}",
        plan.cells.len(),
        request.target,
        plan.cells
    );
    apply(
        world,
        Command::CommitBridge {
            cells: plan.cells.clone(),
        },
        out_events,
    );
    Some(plan)
}
