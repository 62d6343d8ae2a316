#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-by-turn decision making for the Isle Agent.
//!
//! The [`Planner`] owns the [`WorldModel`]. Each turn it applies the fresh
//! observation, refills its action queue from an ordered policy when the
//! queue is empty, and emits exactly one primitive action. The emitted action
//! is applied to the world before it is returned so the belief state always
//! matches what the game will do.

mod route;
mod rules;

use std::collections::VecDeque;

use isle_agent_core::{Action, Command, Event, Item, Observation};
use isle_agent_world::{apply, query, WorldModel};
use tracing::{debug, trace, warn};

/// Configuration for the planner and the world it owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    world: isle_agent_world::Config,
}

impl Config {
    /// Creates a planner configuration around the provided world settings.
    #[must_use]
    pub const fn new(world: isle_agent_world::Config) -> Self {
        Self { world }
    }

    /// Settings used to construct the world.
    #[must_use]
    pub const fn world(&self) -> isle_agent_world::Config {
        self.world
    }
}

/// Sticky notes about which tool would unlock the way to the treasure.
///
/// A hint is raised when the treasure is known but unreachable and a tool
/// would make it reachable. It is cleared only when that tool is collected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hints {
    need_key: bool,
    need_axe: bool,
}

impl Hints {
    /// Whether a key is believed to stand between the agent and the treasure.
    #[must_use]
    pub const fn need_key(&self) -> bool {
        self.need_key
    }

    /// Whether an axe is believed to stand between the agent and the treasure.
    #[must_use]
    pub const fn need_axe(&self) -> bool {
        self.need_axe
    }
}

/// Decides the agent's next action from its belief state.
#[derive(Debug)]
pub struct Planner {
    world: WorldModel,
    pending: VecDeque<Action>,
    hints: Hints,
    events: Vec<Event>,
}

impl Planner {
    /// Creates a planner with an unexplored world.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            world: WorldModel::with_config(config.world()),
            pending: VecDeque::new(),
            hints: Hints::default(),
            events: Vec::new(),
        }
    }

    /// Absorbs an observation and returns the action to send this turn.
    pub fn next_action(&mut self, observation: Observation) -> Action {
        self.events.clear();
        apply(
            &mut self.world,
            Command::Observe { observation },
            &mut self.events,
        );

        if self.queued_step_is_blocked() {
            debug!("discarding {} stale queued actions", self.pending.len());
            self.pending.clear();
        }
        if self.pending.is_empty() {
            self.refill();
        }

        let action = self.pending.pop_front().unwrap_or_else(|| {
            warn!("no rule produced an action; turning left to reveal more terrain");
            Action::TurnLeft
        });

        self.events.clear();
        apply(&mut self.world, Command::Perform { action }, &mut self.events);
        for event in &self.events {
            match event {
                Event::ItemCollected { item: Item::Key, .. } => self.hints.need_key = false,
                Event::ItemCollected { item: Item::Axe, .. } => self.hints.need_axe = false,
                _ => {}
            }
        }

        action
    }

    /// Belief state owned by the planner.
    #[must_use]
    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    /// Current tool hints.
    #[must_use]
    pub fn hints(&self) -> Hints {
        self.hints
    }

    /// Actions already committed to but not yet emitted.
    pub fn pending(&self) -> impl Iterator<Item = Action> + '_ {
        self.pending.iter().copied()
    }

    /// Reports whether the next queued step would walk into a cell the
    /// latest observation shows to be impassable.
    ///
    /// Queues are otherwise only replaced once they run dry. This check only
    /// fires when the belief the queue was planned on turns out to be wrong.
    fn queued_step_is_blocked(&self) -> bool {
        if self.pending.front() != Some(&Action::Forward) {
            return false;
        }
        let ahead = query::pose(&self.world).ahead();
        !query::tile(&self.world, ahead).is_passable(query::capabilities(&self.world))
    }

    fn refill(&mut self) {
        for rule in &rules::POLICY {
            match (rule.evaluate)(&mut self.world, &mut self.hints) {
                Some(actions) if !actions.is_empty() => {
                    debug!(
                        "rule {} queued {} actions at {:?}",
                        rule.name,
                        actions.len(),
                        query::pose(&self.world).position()
                    );
                    self.pending.extend(actions);
                    return;
                }
                _ => trace!("rule {} yielded nothing", rule.name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_agent_core::Coordinate;

    fn planner() -> Planner {
        Planner::new(Config::new(isle_agent_world::Config::new(8)))
    }

    fn observation(rows: [&str; 5]) -> Observation {
        Observation::parse(&rows).expect("valid observation")
    }

    #[test]
    fn visible_treasure_is_fetched_directly() {
        let mut planner = planner();

        let action = planner.next_action(observation([
            "     ", "     ", "    $", "     ", "     ",
        ]));

        assert_eq!(action, Action::TurnRight);
        assert_eq!(
            planner.pending().collect::<Vec<_>>(),
            vec![Action::Forward, Action::Forward]
        );
    }

    #[test]
    fn locked_treasure_raises_the_key_hint() {
        let mut planner = planner();

        let _ = planner.next_action(observation([
            "**$**", "**-**", "     ", "     ", "     ",
        ]));

        assert!(planner.hints().need_key());
        assert!(!planner.hints().need_axe());
    }

    #[test]
    fn walled_in_agent_falls_back_to_turning_left() {
        let mut planner = planner();

        let action = planner.next_action(observation([
            ".....", ".***.", ".* *.", ".***.", ".....",
        ]));

        assert_eq!(action, Action::TurnLeft);
        assert_eq!(query::pose(planner.world()).position(), Coordinate::new(0, 0));
    }

    #[test]
    fn blocked_queue_is_replanned() {
        let mut planner = planner();
        let _ = planner.next_action(observation([
            "     ", "     ", "    $", "     ", "     ",
        ]));

        // Facing east now; a wall appears right in front of the agent.
        let action = planner.next_action(observation([
            "  $  ", "  *  ", "     ", "     ", "     ",
        ]));

        assert_ne!(action, Action::Forward);
    }
}
