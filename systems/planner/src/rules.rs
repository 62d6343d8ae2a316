//! Ordered policy consulted whenever the action queue runs dry.

use isle_agent_core::{Action, Coordinate, ORIGIN};
use isle_agent_system_bridging::{search_and_commit, BridgeRequest};
use isle_agent_system_frontier::{borders_unknown, next_frontier};
use isle_agent_system_reachability::{can_reach, reachable_region};
use isle_agent_world::{query, Resource, WorldModel};
use tracing::trace;

use crate::{
    route::{nearest_route, route_to},
    Hints,
};

/// Named step of the policy.
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    pub(crate) evaluate: fn(&mut WorldModel, &mut Hints) -> Option<Vec<Action>>,
}

/// Rules in priority order; the first that yields actions wins.
pub(crate) const POLICY: [Rule; 8] = [
    Rule {
        name: "return-with-treasure",
        evaluate: return_with_treasure,
    },
    Rule {
        name: "fetch-treasure",
        evaluate: fetch_treasure,
    },
    Rule {
        name: "diagnose-treasure",
        evaluate: diagnose_treasure,
    },
    Rule {
        name: "fetch-needed-tool",
        evaluate: fetch_needed_tool,
    },
    Rule {
        name: "explore",
        evaluate: explore,
    },
    Rule {
        name: "scavenge",
        evaluate: scavenge,
    },
    Rule {
        name: "bridge",
        evaluate: bridge,
    },
    Rule {
        name: "go-home",
        evaluate: go_home,
    },
];

fn return_with_treasure(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    if !query::inventory(world).has_treasure() {
        return None;
    }
    route_to(world, ORIGIN)
}

fn fetch_treasure(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    let treasure = query::treasure(world)?;
    if query::inventory(world).has_treasure() {
        return None;
    }
    route_to(world, treasure)
}

fn diagnose_treasure(world: &mut WorldModel, hints: &mut Hints) -> Option<Vec<Action>> {
    let treasure = query::treasure(world)?;
    if query::inventory(world).has_treasure() {
        return None;
    }

    let view = query::tile_view(world);
    let start = query::pose(world).position();
    let capabilities = query::capabilities(world);
    if can_reach(&view, start, treasure, capabilities) {
        return None;
    }

    let key_helps = !capabilities.has_key
        && can_reach(&view, start, treasure, capabilities.with_key());
    let axe_helps = !capabilities.has_axe
        && can_reach(&view, start, treasure, capabilities.with_axe());
    let both_help = !key_helps
        && !axe_helps
        && !capabilities.has_key
        && !capabilities.has_axe
        && can_reach(&view, start, treasure, capabilities.with_key().with_axe());

    if key_helps || both_help {
        hints.need_key = true;
    }
    if axe_helps || both_help {
        hints.need_axe = true;
    }
    trace!(
        "treasure at {:?} unreachable; need key: {}, need axe: {}",
        treasure,
        hints.need_key,
        hints.need_axe
    );

    None
}

fn fetch_needed_tool(world: &mut WorldModel, hints: &mut Hints) -> Option<Vec<Action>> {
    let inventory = query::inventory(world);

    if hints.need_key && !inventory.has_key() {
        let keys = query::discovered(world, Resource::Key).iter().copied();
        if let Some(actions) = nearest_route(world, keys) {
            return Some(actions);
        }
    }

    if hints.need_axe && !inventory.has_axe() {
        let axes = query::discovered(world, Resource::Axe).iter().copied();
        return nearest_route(world, axes);
    }

    None
}

fn explore(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    let position = query::pose(world).position();
    let frontier = next_frontier(
        &query::tile_view(world),
        position,
        query::capabilities(world),
    );
    if frontier == position {
        return None;
    }
    route_to(world, frontier)
}

fn scavenge(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    let world: &WorldModel = world;
    let inventory = query::inventory(world);
    let mut kinds = Vec::with_capacity(4);
    if !inventory.has_key() {
        kinds.push(Resource::Key);
    }
    if !inventory.has_axe() {
        kinds.push(Resource::Axe);
    }
    kinds.extend([Resource::BridgeResource, Resource::Tree]);

    kinds.into_iter().find_map(|kind| {
        let cells = query::discovered(world, kind).iter().copied();
        nearest_route(world, cells)
    })
}

fn bridge(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    let budget = query::inventory(world).bridge_resources();
    if budget == 0 {
        return None;
    }

    for (target, anchors) in bridge_targets(world) {
        let request = BridgeRequest::new(target, budget).with_anchors(anchors);
        let mut events = Vec::new();
        if search_and_commit(world, &request, &mut events).is_none() {
            continue;
        }
        if let Some(actions) = route_to(world, target) {
            return Some(actions);
        }
    }

    None
}

/// Unreachable cells worth bridging to, each with the anchors that score
/// candidate bridges towards it.
fn bridge_targets(world: &WorldModel) -> Vec<(Coordinate, Vec<Coordinate>)> {
    let view = query::tile_view(world);
    let capabilities = query::capabilities(world);
    let region = reachable_region(&view, query::pose(world).position(), capabilities);
    let inventory = query::inventory(world);
    let treasure = query::treasure(world);

    let anchors_for = |kind: Option<Resource>, target: Coordinate| -> Vec<Coordinate> {
        match (treasure, kind) {
            (Some(treasure), _) => vec![treasure],
            (None, Some(kind)) => query::discovered(world, kind).iter().copied().collect(),
            (None, None) => vec![target],
        }
    };

    let mut targets = Vec::new();
    if inventory.has_treasure() {
        targets.push((ORIGIN, vec![ORIGIN]));
    } else if let Some(treasure) = treasure {
        targets.push((treasure, vec![treasure]));
    }

    let mut kinds = vec![Resource::BridgeResource];
    if !inventory.has_key() {
        kinds.push(Resource::Key);
    }
    if !inventory.has_axe() {
        kinds.push(Resource::Axe);
    }
    for kind in kinds {
        for &cell in query::discovered(world, kind) {
            targets.push((cell, anchors_for(Some(kind), cell)));
        }
    }

    for &cell in query::discovered(world, Resource::Empty) {
        if borders_unknown(&view, cell) {
            targets.push((cell, anchors_for(None, cell)));
        }
    }

    targets.retain(|(target, _)| !region.contains(*target));
    targets
}

fn go_home(world: &mut WorldModel, _: &mut Hints) -> Option<Vec<Action>> {
    route_to(world, ORIGIN)
}
