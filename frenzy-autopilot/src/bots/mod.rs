//! Scripted players for unattended sessions.
//!
//! A bot never sees the future: each poll hands it the same `WorldSnapshot`
//! a rendering client would have at that instant, and it answers with at
//! most one click. The engine is deterministic and the poll cadence is
//! fixed, so a bot's whole session is a pure function of its seed and
//! board.

use frenzy_core::sim::WorldSnapshot;

mod roster;

pub use roster::{bot_ids, create_bot, describe_bots};

/// A scripted player. `reset` runs once before the session starts,
/// `pick_click` once per poll while it runs.
pub trait ReflexBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn pick_click(&mut self, world: &WorldSnapshot) -> Option<u32>;
}

/// Tuning for the reaction family. A member waits out its reaction delay
/// after each spawn, then clicks either only targets matching the
/// announced color or anything still clickable.
#[derive(Clone, Copy, Debug)]
pub struct ReactionConfig {
    pub id: &'static str,
    pub description: &'static str,
    pub reaction_delay_ms: u32,
    pub match_only: bool,
    pub prefer_newest: bool,
}

pub struct ReactionBot {
    config: ReactionConfig,
}

impl ReactionBot {
    pub fn new(config: ReactionConfig) -> Self {
        Self { config }
    }
}

impl ReflexBot for ReactionBot {
    fn id(&self) -> &'static str {
        self.config.id
    }

    fn description(&self) -> &'static str {
        self.config.description
    }

    fn reset(&mut self, _seed: u32) {}

    fn pick_click(&mut self, world: &WorldSnapshot) -> Option<u32> {
        let config = self.config;
        let candidates = world.targets.iter().filter(|target| {
            !target.resolving
                && (!config.match_only || target.color == world.target_color)
                && world.now_ms.saturating_sub(target.spawned_at_ms) >= config.reaction_delay_ms
        });
        let pick = if config.prefer_newest {
            candidates.max_by_key(|target| target.id)
        } else {
            candidates.min_by_key(|target| target.id)
        };
        pick.map(|target| target.id)
    }
}

/// Sits the round out. A floor for benchmarks, and the cheapest way to
/// produce a zero-click tape that still verifies.
pub struct SpectatorBot;

impl ReflexBot for SpectatorBot {
    fn id(&self) -> &'static str {
        "spectator"
    }

    fn description(&self) -> &'static str {
        "never clicks; a verifiable zero-score baseline"
    }

    fn reset(&mut self, _seed: u32) {}

    fn pick_click(&mut self, _world: &WorldSnapshot) -> Option<u32> {
        None
    }
}
