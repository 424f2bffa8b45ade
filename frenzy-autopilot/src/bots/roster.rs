//! Every scripted player the CLI can field, keyed by id.

use super::{ReactionBot, ReactionConfig, ReflexBot, SpectatorBot};

const REACTION_BOTS: &[ReactionConfig] = &[
    ReactionConfig {
        id: "sniper",
        description: "waits a human-ish 200ms, then clicks the oldest target matching the announced color",
        reaction_delay_ms: 200,
        match_only: true,
        prefer_newest: false,
    },
    ReactionConfig {
        id: "sniper-quick",
        description: "sniper with the reaction delay cut to a single poll",
        reaction_delay_ms: 50,
        match_only: true,
        prefer_newest: false,
    },
    ReactionConfig {
        id: "rusher",
        description: "clicks the newest clickable target every poll, mismatches and all",
        reaction_delay_ms: 0,
        match_only: false,
        prefer_newest: true,
    },
];

pub fn bot_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = REACTION_BOTS.iter().map(|config| config.id).collect();
    ids.push(SpectatorBot.id());
    ids
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    let mut described: Vec<(&'static str, &'static str)> = REACTION_BOTS
        .iter()
        .map(|config| (config.id, config.description))
        .collect();
    described.push((SpectatorBot.id(), SpectatorBot.description()));
    described
}

pub fn create_bot(id: &str) -> Option<Box<dyn ReflexBot>> {
    if id == SpectatorBot.id() {
        return Some(Box::new(SpectatorBot));
    }
    REACTION_BOTS
        .iter()
        .find(|config| config.id == id)
        .map(|config| Box::new(ReactionBot::new(*config)) as Box<dyn ReflexBot>)
}
