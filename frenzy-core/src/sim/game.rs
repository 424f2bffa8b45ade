use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};

use super::*;

/// A scheduled callback. Entries are ordered by deadline, ties broken by
/// scheduling order, so callbacks fire exactly as a single-threaded event
/// loop would fire them.
#[derive(Clone, Copy, Debug)]
struct TimerEntry {
    fire_at_ms: u32,
    seq: u64,
    session: u32,
    kind: TimerKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    ClockTick,
    Spawn { epoch: u32 },
    TargetExpiry { id: u32 },
    TargetRemoval { id: u32 },
    ColorRotate,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at_ms == other.fire_at_ms && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at_ms
            .cmp(&other.fire_at_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone)]
pub(super) struct Game {
    config: GameConfig,
    phase: Phase,
    seed: u32,
    score: u32,
    time_left_s: u32,
    level: u32,
    target_color: Color,
    now_ms: u32,
    session: u32,
    spawn_epoch: u32,
    spawned: u32,
    hits: u32,
    misses: u32,
    expired: u32,
    targets: Vec<Target>,
    timers: BinaryHeap<Reverse<TimerEntry>>,
    timer_seq: u64,
    events: Vec<Event>,
    rng: SeededRng,
}

impl Game {
    pub(super) fn new(config: GameConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            seed: 0,
            score: 0,
            time_left_s: ROUND_SECONDS,
            level: 1,
            target_color: COLORS[0],
            now_ms: 0,
            session: 0,
            spawn_epoch: 0,
            spawned: 0,
            hits: 0,
            misses: 0,
            expired: 0,
            targets: Vec::new(),
            timers: BinaryHeap::new(),
            timer_seq: 0,
            events: Vec::new(),
            rng: SeededRng::new(0),
        }
    }

    /// Starts a fresh session unless one is already running. Bumping the
    /// session generation invalidates every timer the previous session
    /// left behind.
    pub(super) fn start_session(&mut self, seed: u32) -> bool {
        if self.phase == Phase::Running {
            return false;
        }

        self.session = self.session.wrapping_add(1);
        self.timers.clear();
        self.targets.clear();

        self.phase = Phase::Running;
        self.seed = seed;
        self.score = 0;
        self.time_left_s = ROUND_SECONDS;
        self.level = 1;
        self.now_ms = 0;
        self.spawned = 0;
        self.hits = 0;
        self.misses = 0;
        self.expired = 0;
        self.rng = SeededRng::new(seed);

        self.events.push(Event::SessionStarted { seed });
        self.roll_target_color();
        self.schedule(TimerKind::ClockTick, CLOCK_TICK_MS);
        self.restart_spawn_interval();
        true
    }

    pub(super) fn end_session(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Ended;
        self.session = self.session.wrapping_add(1);
        self.timers.clear();
        self.targets.clear();
        self.events.push(Event::SessionEnded { score: self.score });
    }

    /// Processes every due timer in (deadline, scheduling) order, then
    /// moves the clock to `now_ms`. The clock freezes where the session
    /// ends; rewinding is a no-op.
    pub(super) fn advance_to(&mut self, now_ms: u32) {
        if self.phase != Phase::Running || now_ms <= self.now_ms {
            return;
        }

        while self.phase == Phase::Running {
            let due = match self.timers.peek() {
                Some(Reverse(entry)) if entry.fire_at_ms <= now_ms => *entry,
                _ => break,
            };
            self.timers.pop();
            // Generation guard: an entry scheduled under an earlier
            // session must never touch this one.
            if due.session != self.session {
                continue;
            }
            self.now_ms = due.fire_at_ms;
            match due.kind {
                TimerKind::ClockTick => self.on_clock_tick(),
                TimerKind::Spawn { epoch } => self.on_spawn(epoch),
                TimerKind::TargetExpiry { id } => self.on_target_expiry(id),
                TimerKind::TargetRemoval { id } => self.on_target_removal(id),
                TimerKind::ColorRotate => self.roll_target_color(),
            }
        }

        if self.phase == Phase::Running && now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    /// Resolves a click on a spawned target. Unknown ids, targets already
    /// resolving and clicks outside a running session are no-ops.
    pub(super) fn click(&mut self, target_id: u32) -> ClickOutcome {
        if self.phase != Phase::Running {
            return ClickOutcome::Ignored;
        }
        let Some(index) = self.targets.iter().position(|target| target.id == target_id) else {
            return ClickOutcome::Ignored;
        };
        if self.targets[index].resolving {
            return ClickOutcome::Ignored;
        }

        let color = self.targets[index].color;
        self.targets[index].resolving = true;
        self.schedule(TimerKind::TargetRemoval { id: target_id }, TARGET_REMOVE_DELAY_MS);

        if color == self.target_color {
            let points = self.level * HIT_POINTS_PER_LEVEL;
            self.score += points;
            self.hits += 1;
            self.events.push(Event::TargetHit {
                id: target_id,
                points,
                score: self.score,
            });
            self.schedule(TimerKind::ColorRotate, COLOR_ROTATE_DELAY_MS);
            ClickOutcome::Hit { points }
        } else {
            self.score = self.score.saturating_sub(MISS_PENALTY);
            self.misses += 1;
            self.events.push(Event::TargetMissed {
                id: target_id,
                penalty: MISS_PENALTY,
                score: self.score,
            });
            ClickOutcome::Miss
        }
    }

    fn on_clock_tick(&mut self) {
        self.time_left_s -= 1;
        self.events.push(Event::ClockTick {
            time_left_s: self.time_left_s,
        });

        if self.time_left_s == 0 {
            self.end_session();
            return;
        }
        if self.time_left_s <= LOW_TIME_WARNING_SECONDS {
            self.events.push(Event::LowTime {
                time_left_s: self.time_left_s,
            });
        }
        // time_left is 1..=59 here, so a multiple of fifteen means 45, 30
        // or 15: the final tick never levels up.
        if self.time_left_s.is_multiple_of(LEVEL_STEP_SECONDS) {
            self.level_up();
        }

        self.schedule(TimerKind::ClockTick, CLOCK_TICK_MS);
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.events.push(Event::LevelChanged { level: self.level });
        self.restart_spawn_interval();
    }

    /// Cancels the pending spawn cadence and starts a full interval at the
    /// current level's rate.
    fn restart_spawn_interval(&mut self) {
        self.spawn_epoch = self.spawn_epoch.wrapping_add(1);
        self.schedule(
            TimerKind::Spawn {
                epoch: self.spawn_epoch,
            },
            spawn_interval_ms(self.level),
        );
    }

    fn on_spawn(&mut self, epoch: u32) {
        // A level change superseded this cadence mid-interval.
        if epoch != self.spawn_epoch {
            return;
        }
        self.spawn_target();
        self.schedule(TimerKind::Spawn { epoch }, spawn_interval_ms(self.level));
    }

    fn spawn_target(&mut self) {
        // Draw order is part of the replay contract: size, x, y, color.
        let size_px = TARGET_SIZE_MIN_PX + self.rng.next_int(TARGET_SIZE_SPAN_PX);
        let x = self.rng.next_int(self.config.board_width() - size_px);
        let y = self.rng.next_int(self.config.board_height() - size_px);
        let color = COLORS[self.rng.next_int(COLORS.len() as u32) as usize];

        let id = self.spawned;
        self.spawned += 1;
        let lifetime_ms = target_lifetime_ms(self.level);
        let expires_at_ms = self.now_ms + lifetime_ms;

        self.targets.push(Target {
            id,
            color,
            size_px,
            x,
            y,
            spawned_at_ms: self.now_ms,
            expires_at_ms,
            resolving: false,
        });
        self.events.push(Event::TargetSpawned {
            id,
            color,
            size_px,
            x,
            y,
            expires_at_ms,
        });
        self.schedule(TimerKind::TargetExpiry { id }, lifetime_ms);
    }

    fn on_target_expiry(&mut self, id: u32) {
        let Some(index) = self.targets.iter().position(|target| target.id == id) else {
            return;
        };
        // A click got there first; the removal timer owns this target now.
        if self.targets[index].resolving {
            return;
        }
        self.targets.remove(index);
        self.expired += 1;
        self.events.push(Event::TargetExpired { id });
    }

    fn on_target_removal(&mut self, id: u32) {
        let Some(index) = self.targets.iter().position(|target| target.id == id) else {
            return;
        };
        self.targets.remove(index);
        self.events.push(Event::TargetRemoved { id });
    }

    /// Picks the color the player must match next. Re-picking the current
    /// color is allowed.
    fn roll_target_color(&mut self) {
        self.target_color = COLORS[self.rng.next_int(COLORS.len() as u32) as usize];
        self.events.push(Event::TargetColorChanged {
            color: self.target_color,
        });
    }

    fn schedule(&mut self, kind: TimerKind, delay_ms: u32) {
        let entry = TimerEntry {
            fire_at_ms: self.now_ms + delay_ms,
            seq: self.timer_seq,
            session: self.session,
            kind,
        };
        self.timer_seq += 1;
        self.timers.push(Reverse(entry));
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        match self.phase {
            Phase::Idle | Phase::Ended => {
                if !self.targets.is_empty() {
                    return Err(RuleCode::PhaseTargetConsistency);
                }
            }
            Phase::Running => {
                if self.time_left_s == 0 || self.time_left_s > ROUND_SECONDS {
                    return Err(RuleCode::ClockTimeRange);
                }
                if self.level != expected_level_for_time(self.time_left_s) {
                    return Err(RuleCode::ClockLevelConsistency);
                }
            }
        }

        let mut prev_id = None;
        for target in &self.targets {
            if target.size_px < TARGET_SIZE_MIN_PX
                || target.size_px >= TARGET_SIZE_MIN_PX + TARGET_SIZE_SPAN_PX
            {
                return Err(RuleCode::TargetSizeRange);
            }
            let right = target
                .x
                .checked_add(target.size_px)
                .ok_or(RuleCode::TargetBounds)?;
            let bottom = target
                .y
                .checked_add(target.size_px)
                .ok_or(RuleCode::TargetBounds)?;
            if right > self.config.board_width() || bottom > self.config.board_height() {
                return Err(RuleCode::TargetBounds);
            }
            let lifetime = target
                .expires_at_ms
                .checked_sub(target.spawned_at_ms)
                .ok_or(RuleCode::TargetLifetimeRange)?;
            if !(TARGET_LIFETIME_FLOOR_MS..=TARGET_LIFETIME_BASE_MS).contains(&lifetime) {
                return Err(RuleCode::TargetLifetimeRange);
            }
            if target.id >= self.spawned {
                return Err(RuleCode::TargetIdOrder);
            }
            if let Some(prev) = prev_id {
                if target.id <= prev {
                    return Err(RuleCode::TargetIdOrder);
                }
            }
            prev_id = Some(target.id);
            if !target.resolving && target.expires_at_ms <= self.now_ms {
                return Err(RuleCode::TargetExpiryPending);
            }
        }

        Ok(())
    }

    pub(super) fn transition_state(&self) -> TransitionState {
        TransitionState {
            now_ms: self.now_ms,
            score: self.score,
            time_left_s: self.time_left_s,
            level: self.level,
            spawned: self.spawned,
        }
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            config: self.config,
            phase: self.phase,
            now_ms: self.now_ms,
            score: self.score,
            time_left_s: self.time_left_s,
            level: self.level,
            target_color: self.target_color,
            rng_state: self.rng.state(),
            hits: self.hits,
            misses: self.misses,
            expired: self.expired,
            spawned: self.spawned,
            targets: self
                .targets
                .iter()
                .map(|entry| Self::target_snapshot(*entry))
                .collect(),
        }
    }

    #[inline]
    fn target_snapshot(target: Target) -> TargetSnapshot {
        TargetSnapshot {
            id: target.id,
            color: target.color,
            size_px: target.size_px,
            x: target.x,
            y: target.y,
            spawned_at_ms: target.spawned_at_ms,
            expires_at_ms: target.expires_at_ms,
            resolving: target.resolving,
        }
    }

    pub(super) fn result(&self) -> SessionResult {
        SessionResult {
            seed: self.seed,
            final_score: self.score,
            level: self.level,
            hits: self.hits,
            misses: self.misses,
            expired: self.expired,
            spawned: self.spawned,
            final_rng_state: self.rng.state(),
        }
    }

    pub(super) fn drain_events(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.events)
    }

    #[inline]
    pub(super) fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub(super) fn now_ms(&self) -> u32 {
        self.now_ms
    }

    #[inline]
    pub(super) fn targets_spawned(&self) -> u32 {
        self.spawned
    }
}

#[cfg(test)]
mod tests;
