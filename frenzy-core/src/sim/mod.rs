use alloc::vec::Vec;

use crate::constants::{
    BOARD_EXTENT_MAX_PX, BOARD_EXTENT_MIN_PX, BOARD_HEIGHT_DEFAULT_PX, BOARD_WIDTH_DEFAULT_PX,
    CLOCK_TICK_MS, COLOR_ROTATE_DELAY_MS, HIT_POINTS_PER_LEVEL, LEVEL_MAX, LEVEL_STEP_SECONDS,
    LOW_TIME_WARNING_SECONDS, MISS_PENALTY, ROUND_MS, ROUND_SECONDS, SPAWN_INTERVAL_BASE_MS,
    SPAWN_INTERVAL_FLOOR_MS, SPAWN_INTERVAL_STEP_MS, TARGET_LIFETIME_BASE_MS,
    TARGET_LIFETIME_FLOOR_MS, TARGET_LIFETIME_STEP_MS, TARGET_REMOVE_DELAY_MS, TARGET_SIZE_MIN_PX,
    TARGET_SIZE_SPAN_PX,
};
use crate::error::RuleCode;
use crate::rng::SeededRng;
use crate::tape::ClickInput;

mod game;

use game::Game;

/// The six playable colors, in wire order. `css_value` is what a renderer
/// paints; the engine only ever compares variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    White,
    Black,
    Gray,
    Blue,
    Green,
}

pub const COLORS: [Color; 6] = [
    Color::Red,
    Color::White,
    Color::Black,
    Color::Gray,
    Color::Blue,
    Color::Green,
];

impl Color {
    pub const fn index(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::White => 1,
            Self::Black => 2,
            Self::Gray => 3,
            Self::Blue => 4,
            Self::Green => 5,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::White),
            2 => Some(Self::Black),
            3 => Some(Self::Gray),
            4 => Some(Self::Blue),
            5 => Some(Self::Green),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::White => "white",
            Self::Black => "black",
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }

    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Red => "#ff0000",
            Self::White => "#ffffff",
            Self::Black => "#000000",
            Self::Gray => "#666666",
            Self::Blue => "#2196F3",
            Self::Green => "#4CAF50",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Ended,
}

/// Board extents in pixels. Extents are clamped so every target fits and
/// the dimensions survive the tape header's u16 fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    board_width: u32,
    board_height: u32,
}

impl GameConfig {
    pub fn new(board_width: u32, board_height: u32) -> Self {
        Self {
            board_width: board_width.clamp(BOARD_EXTENT_MIN_PX, BOARD_EXTENT_MAX_PX),
            board_height: board_height.clamp(BOARD_EXTENT_MIN_PX, BOARD_EXTENT_MAX_PX),
        }
    }

    pub fn board_width(&self) -> u32 {
        self.board_width
    }

    pub fn board_height(&self) -> u32 {
        self.board_height
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH_DEFAULT_PX,
            board_height: BOARD_HEIGHT_DEFAULT_PX,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Target {
    id: u32,
    color: Color,
    size_px: u32,
    x: u32,
    y: u32,
    spawned_at_ms: u32,
    expires_at_ms: u32,
    resolving: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Hit { points: u32 },
    Miss,
    Ignored,
}

/// Everything the render boundary needs, in the order it happened.
/// `SessionEnded` implies the board is cleared; no per-target removal
/// events follow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    SessionStarted { seed: u32 },
    ClockTick { time_left_s: u32 },
    LowTime { time_left_s: u32 },
    LevelChanged { level: u32 },
    TargetSpawned { id: u32, color: Color, size_px: u32, x: u32, y: u32, expires_at_ms: u32 },
    TargetExpired { id: u32 },
    TargetHit { id: u32, points: u32, score: u32 },
    TargetMissed { id: u32, penalty: u32, score: u32 },
    TargetRemoved { id: u32 },
    TargetColorChanged { color: Color },
    SessionEnded { score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub id: u32,
    pub color: Color,
    pub size_px: u32,
    pub x: u32,
    pub y: u32,
    pub spawned_at_ms: u32,
    pub expires_at_ms: u32,
    pub resolving: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub config: GameConfig,
    pub phase: Phase,
    pub now_ms: u32,
    pub score: u32,
    pub time_left_s: u32,
    pub level: u32,
    pub target_color: Color,
    pub rng_state: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub spawned: u32,
    pub targets: Vec<TargetSnapshot>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionResult {
    pub seed: u32,
    pub final_score: u32,
    pub level: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub spawned: u32,
    pub final_rng_state: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub input_index: u32,
    pub rule: RuleCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TransitionState {
    now_ms: u32,
    score: u32,
    time_left_s: u32,
    level: u32,
    spawned: u32,
}

/// One interactive session driven by an embedder: a renderer feeding real
/// clicks, a bot, or a replay. Time only moves through `advance_to`, so
/// the caller decides the clock.
pub struct LiveSession {
    game: Game,
}

impl LiveSession {
    pub fn new(config: GameConfig) -> Self {
        Self {
            game: Game::new(config),
        }
    }

    /// The start trigger. Does nothing when a session is already running;
    /// returns whether a new session began.
    pub fn start(&mut self, seed: u32) -> bool {
        self.game.start_session(seed)
    }

    /// The reset trigger: ends a running session, then starts a new one
    /// unconditionally.
    pub fn reset(&mut self, seed: u32) {
        self.game.end_session();
        self.game.start_session(seed);
    }

    /// Processes every timer due at or before `now_ms`, in deadline order.
    /// Idempotent for equal or earlier times.
    #[inline]
    pub fn advance_to(&mut self, now_ms: u32) {
        self.game.advance_to(now_ms);
    }

    #[inline]
    pub fn click(&mut self, target_id: u32) -> ClickOutcome {
        self.game.click(target_id)
    }

    pub fn click_at(&mut self, at_ms: u32, target_id: u32) -> ClickOutcome {
        self.game.advance_to(at_ms);
        self.game.click(target_id)
    }

    /// Drives the clock to the end of the round. No-op while idle.
    pub fn finish(&mut self) {
        self.game.advance_to(ROUND_MS);
    }

    /// Checks a prospective click against the strict rules without
    /// mutating the session.
    pub fn can_click_strict(&self, input: ClickInput) -> Result<(), RuleCode> {
        if input.at_ms >= ROUND_MS {
            return Err(RuleCode::InputAfterEnd);
        }
        if input.at_ms < self.game.now_ms() {
            return Err(RuleCode::InputOrder);
        }

        let before = self.game.transition_state();
        let mut next = self.game.clone();
        next.advance_to(input.at_ms);
        if input.target >= next.targets_spawned() {
            return Err(RuleCode::UnknownTarget);
        }
        next.click(input.target);
        let after = next.transition_state();

        validate_transition(&before, &after)?;
        next.validate_invariants()?;
        Ok(())
    }

    pub fn click_checked(&mut self, input: ClickInput) -> Result<ClickOutcome, RuleCode> {
        self.can_click_strict(input)?;
        Ok(self.click_at(input.at_ms, input.target))
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.game.phase()
    }

    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.game.now_ms()
    }

    #[inline]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    /// Hands the accumulated events to the embedder and clears the queue.
    #[inline]
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.game.drain_events()
    }

    #[inline]
    pub fn result(&self) -> SessionResult {
        self.game.result()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }
}

/// Re-runs a recorded session to completion. Inputs are applied at their
/// recorded times; out-of-range clicks degrade to no-ops exactly as they
/// would have live.
pub fn replay(seed: u32, config: GameConfig, inputs: &[ClickInput]) -> SessionResult {
    let mut session = LiveSession::new(config);
    session.start(seed);

    for input in inputs {
        session.click_at(input.at_ms, input.target);
    }

    session.finish();
    session.result()
}

/// Replay that additionally validates invariants and transition rules
/// around every applied input, rejecting structurally illegal recordings.
pub fn replay_strict(
    seed: u32,
    config: GameConfig,
    inputs: &[ClickInput],
) -> Result<SessionResult, ReplayViolation> {
    let mut session = LiveSession::new(config);
    session.start(seed);
    session.validate().map_err(|rule| ReplayViolation {
        input_index: 0,
        rule,
    })?;

    for (index, input) in inputs.iter().enumerate() {
        session.click_checked(*input).map_err(|rule| ReplayViolation {
            input_index: index as u32,
            rule,
        })?;
    }

    session.finish();
    session.validate().map_err(|rule| ReplayViolation {
        input_index: inputs.len() as u32,
        rule,
    })?;

    Ok(session.result())
}

fn validate_transition(prev: &TransitionState, next: &TransitionState) -> Result<(), RuleCode> {
    if next.now_ms < prev.now_ms || next.time_left_s > prev.time_left_s {
        return Err(RuleCode::ClockRewind);
    }
    if next.level < prev.level || next.level > LEVEL_MAX {
        return Err(RuleCode::ClockLevelConsistency);
    }
    if next.spawned < prev.spawned {
        return Err(RuleCode::TargetIdOrder);
    }

    if next.score > prev.score {
        if next.score - prev.score != next.level * HIT_POINTS_PER_LEVEL {
            return Err(RuleCode::ScoreDeltaStep);
        }
    } else if next.score < prev.score {
        let delta = prev.score - next.score;
        let floored_to_zero = prev.score < MISS_PENALTY && next.score == 0;
        if delta != MISS_PENALTY && !floored_to_zero {
            return Err(RuleCode::ScoreDeltaStep);
        }
    }

    Ok(())
}

/// Spawn cadence for a level: `max(500, 1000 - level*100)` ms.
#[inline]
pub fn spawn_interval_ms(level: u32) -> u32 {
    let scaled = SPAWN_INTERVAL_BASE_MS.saturating_sub(level.saturating_mul(SPAWN_INTERVAL_STEP_MS));
    core::cmp::max(SPAWN_INTERVAL_FLOOR_MS, scaled)
}

/// Target lifetime for a level: `max(1500, 3000 - level*200)` ms.
#[inline]
pub fn target_lifetime_ms(level: u32) -> u32 {
    let scaled =
        TARGET_LIFETIME_BASE_MS.saturating_sub(level.saturating_mul(TARGET_LIFETIME_STEP_MS));
    core::cmp::max(TARGET_LIFETIME_FLOOR_MS, scaled)
}

/// Level implied by the clock: ups fire when the remaining time crosses
/// 45, 30 and 15 seconds, so `1 + (60 - time_left) / 15` for a live clock.
#[inline]
fn expected_level_for_time(time_left_s: u32) -> u32 {
    1 + ROUND_SECONDS.saturating_sub(time_left_s) / LEVEL_STEP_SECONDS
}
