//! Drives one bot through one session and packages the outcome as a
//! verified click tape plus its metrics.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use frenzy_core::constants::{MAX_TAPE_CLICKS, ROUND_MS};
use frenzy_core::sim::{GameConfig, LiveSession, Phase};
use frenzy_core::tape::{serialize_tape, ClickInput};
use frenzy_core::verify_tape;

use crate::bots::{bot_ids, create_bot, ReflexBot};
use crate::util::seed_to_hex;

/// Bots are polled on a fixed cadence, so a run is reproducible from
/// (bot, seed, board) alone.
pub const POLL_INTERVAL_MS: u32 = 50;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub board_width: u32,
    pub board_height: u32,
    pub final_score: u32,
    pub level_reached: u32,
    pub clicks: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub spawned: u32,
    pub final_rng_state: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<ClickInput>,
    pub tape: Vec<u8>,
}

pub fn run_bot(bot_id: &str, seed: u32, config: GameConfig) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id).ok_or_else(|| {
        anyhow!("unknown bot '{bot_id}'. available: {}", bot_ids().join(", "))
    })?;
    run_bot_instance(bot.as_mut(), seed, config)
}

pub fn run_bot_instance(
    bot: &mut dyn ReflexBot,
    seed: u32,
    config: GameConfig,
) -> Result<RunArtifact> {
    bot.reset(seed);

    let mut session = LiveSession::new(config);
    session.start(seed);

    let mut inputs: Vec<ClickInput> = Vec::new();
    let mut at_ms = 0;
    while at_ms < ROUND_MS {
        at_ms += POLL_INTERVAL_MS;
        session.advance_to(at_ms);
        if session.phase() != Phase::Running {
            break;
        }
        if let Some(target) = bot.pick_click(&session.snapshot()) {
            let input = ClickInput { at_ms, target };
            session.click_checked(input).map_err(|rule| {
                anyhow!("bot '{}' clicked illegally at {at_ms}ms: {rule}", bot.id())
            })?;
            inputs.push(input);
        }
    }
    session.finish();
    session
        .validate()
        .map_err(|rule| anyhow!("session left an inconsistent world: {rule}"))?;

    let result = session.result();
    let tape = serialize_tape(seed, config, &inputs, result.final_score, result.final_rng_state);
    verify_tape(&tape, MAX_TAPE_CLICKS)
        .map_err(|err| anyhow!("generated tape failed verification: {err}"))?;

    tracing::info!(
        "run complete bot={} seed={} score={} hits={} misses={} clicks={}",
        bot.id(),
        seed_to_hex(seed),
        result.final_score,
        result.hits,
        result.misses,
        inputs.len()
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            board_width: config.board_width(),
            board_height: config.board_height(),
            final_score: result.final_score,
            level_reached: result.level,
            clicks: inputs.len() as u32,
            hits: result.hits,
            misses: result.misses,
            expired: result.expired,
            spawned: result.spawned,
            final_rng_state: result.final_rng_state,
        },
        inputs,
        tape,
    })
}

pub fn write_tape(path: &Path, tape: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
    }
    fs::write(path, tape).with_context(|| format!("failed writing {}", path.display()))
}
