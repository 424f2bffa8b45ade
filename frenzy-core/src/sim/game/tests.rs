use super::*;

fn started(seed: u32) -> LiveSession {
    let mut session = LiveSession::new(GameConfig::default());
    assert!(session.start(seed));
    session
}

/// Advances in 50ms polls until a live target matches the current target
/// color, returning the poll time and target id.
fn find_matching_target(session: &mut LiveSession, deadline_ms: u32) -> Option<(u32, u32)> {
    find_target(session, deadline_ms, true)
}

fn find_mismatched_target(session: &mut LiveSession, deadline_ms: u32) -> Option<(u32, u32)> {
    find_target(session, deadline_ms, false)
}

fn find_target(session: &mut LiveSession, deadline_ms: u32, matching: bool) -> Option<(u32, u32)> {
    let mut at_ms = session.now_ms();
    while at_ms < deadline_ms {
        at_ms += 50;
        session.advance_to(at_ms);
        let snapshot = session.snapshot();
        let candidate = snapshot.targets.iter().find(|target| {
            !target.resolving && (target.color == snapshot.target_color) == matching
        });
        if let Some(target) = candidate {
            return Some((at_ms, target.id));
        }
    }
    None
}

fn install_target(game: &mut Game, target: Target) {
    game.targets.clear();
    game.spawned = target.id + 1;
    game.targets.push(target);
}

fn sample_target(game: &Game) -> Target {
    Target {
        id: 3,
        color: Color::Red,
        size_px: 40,
        x: 10,
        y: 10,
        spawned_at_ms: game.now_ms(),
        expires_at_ms: game.now_ms() + 2_000,
        resolving: false,
    }
}

fn assert_invariant_violation<F>(mutate: F, expected: RuleCode)
where
    F: FnOnce(&mut Game),
{
    let mut game = Game::new(GameConfig::default());
    game.start_session(7);
    game.advance_to(1_000);
    mutate(&mut game);
    assert_eq!(game.validate_invariants(), Err(expected));
}

#[test]
fn start_initializes_session() {
    let mut session = started(1);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.time_left_s, ROUND_SECONDS);
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.now_ms, 0);
    assert!(snapshot.targets.is_empty());

    let events = session.drain_events();
    assert_eq!(events[0], Event::SessionStarted { seed: 1 });
    assert!(matches!(events[1], Event::TargetColorChanged { .. }));
    assert_eq!(events.len(), 2);
}

#[test]
fn start_is_noop_while_running() {
    let mut session = started(1);
    session.advance_to(2_500);
    let before = session.snapshot();
    session.drain_events();

    assert!(!session.start(99));
    assert_eq!(session.snapshot(), before);
    assert!(session.drain_events().is_empty());
}

#[test]
fn reset_ends_running_session_and_starts_fresh() {
    let mut session = started(1);
    session.advance_to(2_500);
    session.drain_events();

    session.reset(9);
    let events = session.drain_events();
    assert!(matches!(events[0], Event::SessionEnded { .. }));
    assert_eq!(events[1], Event::SessionStarted { seed: 9 });

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.time_left_s, ROUND_SECONDS);
    assert_eq!(snapshot.now_ms, 0);
    assert_eq!(snapshot.spawned, 0);
    assert!(snapshot.targets.is_empty());
    assert_eq!(session.result().seed, 9);
}

#[test]
fn reset_from_idle_just_starts() {
    let mut session = LiveSession::new(GameConfig::default());
    session.reset(4);
    assert_eq!(session.phase(), Phase::Running);
    let events = session.drain_events();
    assert_eq!(events[0], Event::SessionStarted { seed: 4 });
}

#[test]
fn first_spawn_waits_a_full_interval() {
    // Level 1 cadence: max(500, 1000 - 100) = 900ms.
    let mut session = started(2);
    session.advance_to(899);
    assert_eq!(session.snapshot().spawned, 0);
    session.advance_to(900);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.spawned, 1);
    assert_eq!(snapshot.targets.len(), 1);
    assert_eq!(snapshot.targets[0].id, 0);
}

#[test]
fn level_one_spawn_cadence() {
    let mut session = started(2);
    session.advance_to(5_000);
    // Spawns at 900, 1800, 2700, 3600, 4500.
    assert_eq!(session.snapshot().spawned, 5);
}

#[test]
fn spawned_targets_fit_the_board() {
    let mut session = started(3);
    session.advance_to(20_000);
    assert_eq!(session.validate(), Ok(()));
    for event in session.drain_events() {
        if let Event::TargetSpawned { size_px, x, y, .. } = event {
            assert!((TARGET_SIZE_MIN_PX..TARGET_SIZE_MIN_PX + TARGET_SIZE_SPAN_PX)
                .contains(&size_px));
            assert!(x + size_px <= BOARD_WIDTH_DEFAULT_PX);
            assert!(y + size_px <= BOARD_HEIGHT_DEFAULT_PX);
        }
    }
}

#[test]
fn unclicked_target_expires_silently() {
    let mut session = started(2);
    // First target: spawned 900, level-1 lifetime 2800, expiry 3700.
    session.advance_to(3_699);
    assert!(session.snapshot().targets.iter().any(|t| t.id == 0));

    session.advance_to(3_700);
    let snapshot = session.snapshot();
    assert!(!snapshot.targets.iter().any(|t| t.id == 0));
    assert_eq!(snapshot.expired, 1);
    assert_eq!(snapshot.score, 0);
    assert!(session
        .drain_events()
        .contains(&Event::TargetExpired { id: 0 }));
}

#[test]
fn hit_at_level_one_awards_ten() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_matching_target(&mut session, 14_000) else {
            continue;
        };
        assert_eq!(session.snapshot().level, 1);
        session.drain_events();

        let outcome = session.click_at(at_ms, id);
        assert_eq!(outcome, ClickOutcome::Hit { points: 10 });
        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 10);
        assert_eq!(snapshot.hits, 1);
        assert!(session.drain_events().contains(&Event::TargetHit {
            id,
            points: 10,
            score: 10,
        }));
        return;
    }
    panic!("no seed in 1..=8 produced a level-1 color match");
}

#[test]
fn hit_rotates_target_color_after_delay() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_matching_target(&mut session, 50_000) else {
            continue;
        };
        session.click_at(at_ms, id);
        session.drain_events();

        session.advance_to(at_ms + 299);
        assert!(!session
            .drain_events()
            .iter()
            .any(|event| matches!(event, Event::TargetColorChanged { .. })));

        session.advance_to(at_ms + 300);
        assert!(session
            .drain_events()
            .iter()
            .any(|event| matches!(event, Event::TargetColorChanged { .. })));
        return;
    }
    panic!("no seed in 1..=8 produced a color match");
}

#[test]
fn clicked_target_lingers_then_is_removed() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_matching_target(&mut session, 50_000) else {
            continue;
        };
        session.click_at(at_ms, id);

        session.advance_to(at_ms + 299);
        let lingering = session.snapshot();
        let target = lingering.targets.iter().find(|t| t.id == id);
        assert!(target.is_some_and(|t| t.resolving));

        session.drain_events();
        session.advance_to(at_ms + 300);
        assert!(!session.snapshot().targets.iter().any(|t| t.id == id));
        assert!(session
            .drain_events()
            .contains(&Event::TargetRemoved { id }));
        return;
    }
    panic!("no seed in 1..=8 produced a color match");
}

#[test]
fn miss_at_level_three_deducts_five() {
    for seed in 1..=8 {
        let mut session = started(seed);
        // Bank some points at any level first.
        let Some((hit_ms, hit_id)) = find_matching_target(&mut session, 28_000) else {
            continue;
        };
        if session.click_at(hit_ms, hit_id) == ClickOutcome::Ignored {
            continue;
        }
        session.advance_to(30_050);
        assert_eq!(session.snapshot().level, 3);
        let Some((miss_ms, miss_id)) = find_mismatched_target(&mut session, 44_500) else {
            continue;
        };

        let before = session.snapshot().score;
        assert!(before >= MISS_PENALTY);
        let outcome = session.click_at(miss_ms, miss_id);
        assert_eq!(outcome, ClickOutcome::Miss);
        assert_eq!(session.snapshot().score, before - MISS_PENALTY);
        return;
    }
    panic!("no seed in 1..=8 produced the hit-then-miss scenario");
}

#[test]
fn miss_at_zero_score_stays_zero() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_mismatched_target(&mut session, 20_000) else {
            continue;
        };
        let outcome = session.click_at(at_ms, id);
        assert_eq!(outcome, ClickOutcome::Miss);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.misses, 1);
        return;
    }
    panic!("no seed in 1..=8 produced a color mismatch");
}

#[test]
fn miss_never_rotates_the_target_color() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_mismatched_target(&mut session, 20_000) else {
            continue;
        };
        let before = session.snapshot().target_color;
        session.click_at(at_ms, id);
        session.advance_to(at_ms + 300);
        assert_eq!(session.snapshot().target_color, before);
        return;
    }
    panic!("no seed in 1..=8 produced a color mismatch");
}

#[test]
fn click_on_expired_target_is_ignored() {
    let mut session = started(2);
    session.advance_to(3_700);
    assert_eq!(session.snapshot().expired, 1);

    assert_eq!(session.click(0), ClickOutcome::Ignored);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.hits + snapshot.misses, 0);
    assert_eq!(snapshot.score, 0);
}

#[test]
fn second_click_on_resolving_target_is_ignored() {
    for seed in 1..=8 {
        let mut session = started(seed);
        let Some((at_ms, id)) = find_matching_target(&mut session, 50_000) else {
            continue;
        };
        let first = session.click_at(at_ms, id);
        assert!(matches!(first, ClickOutcome::Hit { .. }));
        assert_eq!(session.click(id), ClickOutcome::Ignored);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 0);
        return;
    }
    panic!("no seed in 1..=8 produced a color match");
}

#[test]
fn click_on_unknown_id_is_ignored() {
    let mut session = started(2);
    session.advance_to(1_000);
    assert_eq!(session.click(9_999), ClickOutcome::Ignored);
    assert_eq!(session.snapshot().score, 0);
}

#[test]
fn level_ups_fire_at_45_30_15() {
    let mut session = started(4);
    session.drain_events();

    session.advance_to(15_000);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.time_left_s, 45);
    assert_eq!(snapshot.level, 2);

    session.advance_to(30_000);
    assert_eq!(session.snapshot().level, 3);

    session.advance_to(45_000);
    assert_eq!(session.snapshot().level, 4);

    let level_changes: Vec<_> = session
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::LevelChanged { .. }))
        .collect();
    assert_eq!(
        level_changes,
        [
            Event::LevelChanged { level: 2 },
            Event::LevelChanged { level: 3 },
            Event::LevelChanged { level: 4 },
        ]
    );
}

#[test]
fn final_tick_never_levels_up() {
    let mut session = started(4);
    session.advance_to(60_000);
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.result().level, LEVEL_MAX);

    let level_changes = session
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::LevelChanged { .. }))
        .count();
    assert_eq!(level_changes, 3);
}

#[test]
fn low_time_warnings_cover_the_last_ten_seconds() {
    let mut session = started(4);
    session.advance_to(49_000);
    session.drain_events();

    session.advance_to(60_000);
    let events = session.drain_events();
    let warnings: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::LowTime { time_left_s } => Some(*time_left_s),
            _ => None,
        })
        .collect();
    assert_eq!(warnings, [10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);

    // The last tick reaches zero and ends the session instead.
    let ended = events
        .iter()
        .position(|event| matches!(event, Event::SessionEnded { .. }));
    let last_tick = events
        .iter()
        .rposition(|event| matches!(event, Event::ClockTick { time_left_s: 0 }));
    assert!(last_tick.unwrap() < ended.unwrap());
}

#[test]
fn session_ends_at_zero_and_freezes() {
    let mut session = started(5);
    session.advance_to(100_000);

    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.now_ms(), ROUND_MS);
    assert!(session.snapshot().targets.is_empty());

    let spawned = session.snapshot().spawned;
    session.advance_to(200_000);
    assert_eq!(session.snapshot().spawned, spawned);
    assert_eq!(session.click(0), ClickOutcome::Ignored);
}

#[test]
fn level_up_restarts_the_spawn_interval() {
    let mut session = started(6);
    // Level 1 spawns land on multiples of 900 up to 14_400.
    session.advance_to(14_400);
    assert_eq!(session.snapshot().spawned, 16);

    // The 900-cadence would spawn again at 15_300, but the level-up at
    // 15_000 cancels it; the level-2 cadence first fires at 15_800.
    session.advance_to(15_799);
    assert_eq!(session.snapshot().spawned, 16);
    session.advance_to(15_800);
    assert_eq!(session.snapshot().spawned, 17);
}

#[test]
fn identical_seeds_and_inputs_stay_identical() {
    let mut a = started(5);
    let mut b = started(5);
    for at_ms in (0..=60_000u32).step_by(1_000) {
        a.advance_to(at_ms);
        b.advance_to(at_ms);
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.drain_events(), b.drain_events());
    }
    assert_eq!(a.result(), b.result());
}

#[test]
fn different_seeds_diverge() {
    let mut a = started(1);
    let mut b = started(2);
    a.advance_to(5_000);
    b.advance_to(5_000);
    assert_ne!(a.snapshot().rng_state, b.snapshot().rng_state);
}

#[test]
fn idle_game_with_targets_is_flagged() {
    let mut game = Game::new(GameConfig::default());
    game.targets.push(Target {
        id: 0,
        color: Color::Red,
        size_px: 40,
        x: 0,
        y: 0,
        spawned_at_ms: 0,
        expires_at_ms: 2_000,
        resolving: false,
    });
    assert_eq!(
        game.validate_invariants(),
        Err(RuleCode::PhaseTargetConsistency)
    );
}

#[test]
fn running_session_validates_clean() {
    let mut game = Game::new(GameConfig::default());
    game.start_session(7);
    game.advance_to(12_345);
    assert_eq!(game.validate_invariants(), Ok(()));
}

#[test]
fn oversized_target_is_flagged() {
    assert_invariant_violation(
        |game| {
            let mut target = sample_target(game);
            target.size_px = TARGET_SIZE_MIN_PX + TARGET_SIZE_SPAN_PX;
            install_target(game, target);
        },
        RuleCode::TargetSizeRange,
    );
}

#[test]
fn undersized_target_is_flagged() {
    assert_invariant_violation(
        |game| {
            let mut target = sample_target(game);
            target.size_px = TARGET_SIZE_MIN_PX - 1;
            install_target(game, target);
        },
        RuleCode::TargetSizeRange,
    );
}

#[test]
fn out_of_bounds_target_is_flagged() {
    assert_invariant_violation(
        |game| {
            let mut target = sample_target(game);
            target.x = BOARD_WIDTH_DEFAULT_PX - target.size_px + 1;
            install_target(game, target);
        },
        RuleCode::TargetBounds,
    );
}

#[test]
fn absurd_lifetime_is_flagged() {
    assert_invariant_violation(
        |game| {
            let mut target = sample_target(game);
            target.expires_at_ms = target.spawned_at_ms + TARGET_LIFETIME_BASE_MS + 1;
            install_target(game, target);
        },
        RuleCode::TargetLifetimeRange,
    );
}

#[test]
fn inverted_lifetime_is_flagged() {
    assert_invariant_violation(
        |game| {
            let mut target = sample_target(game);
            target.expires_at_ms = target.spawned_at_ms.saturating_sub(1);
            install_target(game, target);
        },
        RuleCode::TargetLifetimeRange,
    );
}

#[test]
fn id_beyond_spawn_counter_is_flagged() {
    assert_invariant_violation(
        |game| {
            let target = sample_target(game);
            install_target(game, target);
            game.spawned = 2;
        },
        RuleCode::TargetIdOrder,
    );
}

#[test]
fn unsorted_target_ids_are_flagged() {
    assert_invariant_violation(
        |game| {
            let first = sample_target(game);
            install_target(game, first);
            let mut second = sample_target(game);
            second.id = 1;
            game.spawned = 10;
            game.targets.push(second);
        },
        RuleCode::TargetIdOrder,
    );
}

#[test]
fn overdue_unresolved_target_is_flagged() {
    assert_invariant_violation(
        |game| {
            game.advance_to(4_000);
            let mut target = sample_target(game);
            target.spawned_at_ms = 1_500;
            target.expires_at_ms = 3_000;
            install_target(game, target);
        },
        RuleCode::TargetExpiryPending,
    );
}

#[test]
fn ended_session_with_targets_is_flagged() {
    assert_invariant_violation(
        |game| {
            let target = sample_target(game);
            game.end_session();
            game.targets.push(target);
            game.spawned = target.id + 1;
        },
        RuleCode::PhaseTargetConsistency,
    );
}

#[test]
fn running_clock_at_zero_is_flagged() {
    assert_invariant_violation(
        |game| {
            game.time_left_s = 0;
        },
        RuleCode::ClockTimeRange,
    );
}

#[test]
fn level_out_of_step_with_clock_is_flagged() {
    assert_invariant_violation(
        |game| {
            game.level = 3;
        },
        RuleCode::ClockLevelConsistency,
    );
}

fn transition(now_ms: u32, score: u32, time_left_s: u32, level: u32, spawned: u32) -> TransitionState {
    TransitionState {
        now_ms,
        score,
        time_left_s,
        level,
        spawned,
    }
}

#[test]
fn transition_accepts_hit_and_miss_deltas() {
    let prev = transition(1_000, 20, 59, 1, 2);
    assert_eq!(
        validate_transition(&prev, &transition(2_000, 30, 58, 1, 3)),
        Ok(())
    );
    assert_eq!(
        validate_transition(&prev, &transition(2_000, 15, 58, 1, 3)),
        Ok(())
    );
    // Level-2 hit is worth 20.
    let prev = transition(16_000, 0, 44, 2, 10);
    assert_eq!(
        validate_transition(&prev, &transition(16_050, 20, 44, 2, 10)),
        Ok(())
    );
}

#[test]
fn transition_accepts_floored_miss() {
    let prev = transition(1_000, 3, 59, 1, 2);
    assert_eq!(
        validate_transition(&prev, &transition(1_500, 0, 59, 1, 2)),
        Ok(())
    );
}

#[test]
fn transition_rejects_bogus_score_jump() {
    let prev = transition(1_000, 20, 59, 1, 2);
    assert_eq!(
        validate_transition(&prev, &transition(2_000, 27, 58, 1, 2)),
        Err(RuleCode::ScoreDeltaStep)
    );
    assert_eq!(
        validate_transition(&prev, &transition(2_000, 16, 58, 1, 2)),
        Err(RuleCode::ScoreDeltaStep)
    );
}

#[test]
fn transition_rejects_clock_rewind() {
    let prev = transition(5_000, 0, 55, 1, 4);
    assert_eq!(
        validate_transition(&prev, &transition(4_000, 0, 55, 1, 4)),
        Err(RuleCode::ClockRewind)
    );
    assert_eq!(
        validate_transition(&prev, &transition(5_000, 0, 56, 1, 4)),
        Err(RuleCode::ClockRewind)
    );
}

#[test]
fn transition_rejects_level_regression_and_overshoot() {
    let prev = transition(31_000, 0, 29, 3, 20);
    assert_eq!(
        validate_transition(&prev, &transition(32_000, 0, 28, 2, 20)),
        Err(RuleCode::ClockLevelConsistency)
    );
    assert_eq!(
        validate_transition(&prev, &transition(32_000, 0, 28, 5, 20)),
        Err(RuleCode::ClockLevelConsistency)
    );
}

#[test]
fn transition_rejects_spawn_counter_rewind() {
    let prev = transition(5_000, 0, 55, 1, 4);
    assert_eq!(
        validate_transition(&prev, &transition(6_000, 0, 54, 1, 3)),
        Err(RuleCode::TargetIdOrder)
    );
}

#[test]
fn strict_click_rejects_future_target() {
    let session = started(2);
    let err = session.can_click_strict(ClickInput {
        at_ms: 100,
        target: 0,
    });
    // Nothing has spawned by 100ms.
    assert_eq!(err, Err(RuleCode::UnknownTarget));
}

#[test]
fn strict_click_rejects_post_round_time() {
    let session = started(2);
    let err = session.can_click_strict(ClickInput {
        at_ms: ROUND_MS,
        target: 0,
    });
    assert_eq!(err, Err(RuleCode::InputAfterEnd));
}

#[test]
fn strict_click_rejects_rewound_time() {
    let mut session = started(2);
    session.advance_to(5_000);
    let err = session.can_click_strict(ClickInput {
        at_ms: 1_000,
        target: 0,
    });
    assert_eq!(err, Err(RuleCode::InputOrder));
}

#[test]
fn strict_click_accepts_live_target() {
    let mut session = started(2);
    session.advance_to(900);
    assert_eq!(
        session.can_click_strict(ClickInput {
            at_ms: 1_000,
            target: 0,
        }),
        Ok(())
    );
    // Probing must not mutate the session.
    assert_eq!(session.now_ms(), 900);
}

#[test]
fn strict_replay_agrees_with_plain_replay() {
    let config = GameConfig::default();
    let seed = 5;

    let mut session = LiveSession::new(config);
    session.start(seed);
    let mut inputs = Vec::new();
    let mut want_match = true;
    while let Some((at_ms, id)) = find_target(&mut session, 55_000, want_match) {
        session.click(id);
        inputs.push(ClickInput { at_ms, target: id });
        want_match = !want_match;
    }
    session.finish();
    let live = session.result();
    assert!(!inputs.is_empty());

    assert_eq!(replay(seed, config, &inputs), live);
    assert_eq!(replay_strict(seed, config, &inputs), Ok(live));
}

#[test]
fn strict_replay_rejects_unclickable_recording() {
    let inputs = [ClickInput {
        at_ms: 100,
        target: 0,
    }];
    assert_eq!(
        replay_strict(5, GameConfig::default(), &inputs),
        Err(ReplayViolation {
            input_index: 0,
            rule: RuleCode::UnknownTarget,
        })
    );
}

#[test]
fn plain_replay_ignores_unclickable_inputs() {
    let inputs = [ClickInput {
        at_ms: 100,
        target: 7,
    }];
    let clean = replay(5, GameConfig::default(), &[]);
    assert_eq!(replay(5, GameConfig::default(), &inputs), clean);
}
