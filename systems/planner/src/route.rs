//! Translation of grid paths into primitive actions.

use isle_agent_core::{Action, Coordinate, Direction, Tile, TileMapView};
use isle_agent_system_pathfinding::search;
use isle_agent_world::{query, WorldModel};

/// Actions that walk the agent from its pose to `goal`.
///
/// Returns `None` when no path exists or the agent already stands on the goal.
pub(crate) fn route_to(world: &WorldModel, goal: Coordinate) -> Option<Vec<Action>> {
    nearest_route(world, std::iter::once(goal))
}

/// Actions towards whichever candidate has the shortest path.
///
/// Equal lengths resolve to the earliest candidate.
pub(crate) fn nearest_route<I>(world: &WorldModel, candidates: I) -> Option<Vec<Action>>
where
    I: IntoIterator<Item = Coordinate>,
{
    let view = query::tile_view(world);
    let pose = query::pose(world);
    let capabilities = query::capabilities(world);

    let path = candidates
        .into_iter()
        .filter_map(|goal| search(&view, pose.position(), goal, capabilities))
        .reduce(|best, path| if path.len() < best.len() { path } else { best })?;

    let actions = translate(&view, pose.facing(), &path);
    (!actions.is_empty()).then_some(actions)
}

/// Converts a path into turns, tool uses and forward steps.
pub(crate) fn translate(view: &TileMapView<'_>, facing: Direction, path: &[Coordinate]) -> Vec<Action> {
    let mut facing = facing;
    let mut actions = Vec::new();

    for edge in path.windows(2) {
        let Some(heading) = edge[0].direction_to(edge[1]) else {
            continue;
        };
        actions.extend(alignment_turns(facing, heading));
        facing = heading;

        match view.tile(edge[1]) {
            Tile::Tree => actions.push(Action::Chop),
            Tile::Door => actions.push(Action::Unlock),
            _ => {}
        }
        actions.push(Action::Forward);
    }

    actions
}

/// Fewest turns rotating `from` onto `to`, preferring left on a tie.
pub(crate) fn alignment_turns(from: Direction, to: Direction) -> Vec<Action> {
    let right = usize::from((4 + to.quarter_turns() - from.quarter_turns()) % 4);
    let left = (4 - right) % 4;

    if left <= right {
        vec![Action::TurnLeft; left]
    } else {
        vec![Action::TurnRight; right]
    }
}
