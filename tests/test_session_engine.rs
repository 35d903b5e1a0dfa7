//! Session and cycle engine behavior driven with explicit timestamps.

use std::collections::HashSet;

use tokio::sync::mpsc;

use vague::catalog::Level;
use vague::config::{SessionConfig, TimingConfig};
use vague::observability::{Event, StopReason};
use vague::pattern::Pattern;
use vague::phase::{Checkpoint, Phase, milestone};
use vague::session::{Session, SessionState};
use vague::time::{Clock, ManualClock};

fn immediate() -> SessionConfig {
    SessionConfig {
        timing: TimingConfig {
            countdown_secs: 0,
            ..TimingConfig::default()
        },
        ..SessionConfig::default()
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ticks `session` every `step` ms from `from` up to and including `to`.
fn run_frames(session: &mut Session, from: u64, to: u64, step: u64) {
    let mut now = from;
    while now <= to {
        session.tick(now);
        now += step;
    }
}

#[test]
fn inhale_midpoint_spawns_marker() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    let mut rx = session.subscribe();
    session.start(0);

    run_frames(&mut session, 0, 2_000, 100);

    let spawned: Vec<(Phase, Checkpoint)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::MarkerSpawned {
                phase, checkpoint, ..
            } => Some((phase, checkpoint)),
            _ => None,
        })
        .collect();
    assert!(spawned.contains(&(Phase::Inhaling, Checkpoint::from_hundredths(50))));
    assert!(spawned.contains(&(Phase::Inhaling, Checkpoint::from_hundredths(25))));
}

#[test]
fn beginner_hold_uses_two_checkpoints() {
    let set: Vec<u8> = milestone::checkpoints(Phase::Holding, &Level::Newbie.pattern())
        .iter()
        .map(|c| c.hundredths())
        .collect();
    assert_eq!(set, [33, 66]);
}

#[test]
fn stop_then_restart_keeps_cycle_count() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    session.start(0);
    run_frames(&mut session, 0, 5_000, 500);
    session.stop(5_000);
    assert_eq!(session.total_ms(5_000), 5_000);
    assert_eq!(session.cycles_completed(), 0);

    let mut rx = session.subscribe();
    session.start(10_000);
    let frame = session.tick(10_000).unwrap();
    assert_eq!(frame.phase(), Phase::Inhaling);
    assert_eq!(frame.location.cycle_fraction, 0.0);
    assert_eq!(session.cycles_completed(), 0);
    assert_eq!(session.total_ms(11_000), 6_000);
    assert_eq!(drain(&mut rx)[0].kind(), "SessionStarted");
}

#[test]
fn tick_past_cycle_end_wraps_with_remainder() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 19_000 - 100, 100);
    drain(&mut rx);

    let frame = session.tick(19_500).unwrap();
    assert_eq!(frame.cycles_completed, 1);
    assert_eq!(frame.phase(), Phase::Inhaling);
    assert!((frame.location.cycle_fraction - 500.0 / 19_000.0).abs() < 1e-9);

    let events = drain(&mut rx);
    let completed = events
        .iter()
        .position(|e| matches!(e, Event::CycleCompleted { count: 1 }))
        .expect("cycle completion");
    let changed = events
        .iter()
        .position(|e| matches!(e, Event::PhaseChanged { phase: Phase::Inhaling, .. }))
        .expect("phase change after wrap");
    assert!(completed < changed);
    // Every marker of the previous cycle is retired before the new cycle starts.
    assert!(
        events[..completed]
            .iter()
            .any(|e| matches!(e, Event::MarkerRetired { .. }))
    );
}

#[test]
fn each_boundary_completes_exactly_one_cycle() {
    let pattern = Pattern::new(1.0, 1.0, 1.0).unwrap();
    let mut session = Session::new(immediate(), pattern);
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 9_500, 16);

    let counts: Vec<u64> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::CycleCompleted { count } => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, [1, 2, 3]);
}

#[test]
fn markers_are_unique_and_follow_their_phase_change() {
    let mut session = Session::new(immediate(), Level::Medium.pattern());
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 28_000, 16);
    session.stop(28_000);

    let mut active: HashSet<(Phase, Checkpoint)> = HashSet::new();
    let mut ids = HashSet::new();
    let mut current = None;
    for event in drain(&mut rx) {
        match event {
            Event::PhaseChanged { phase, .. } => current = Some(phase),
            Event::MarkerSpawned {
                id,
                phase,
                checkpoint,
                ..
            } => {
                assert_eq!(Some(phase), current, "marker spawned outside its phase");
                assert!(active.insert((phase, checkpoint)), "duplicate marker");
                assert!(ids.insert(id), "marker id reused");
            }
            Event::MarkerRetired { .. } => {}
            Event::CycleCompleted { .. } => active.clear(),
            _ => {}
        }
    }
    assert!(!ids.is_empty());
    assert!(session.engine().active_markers().next().is_none());
}

#[test]
fn phase_changes_follow_inhale_hold_exhale() {
    let mut session = Session::new(immediate(), Level::Newbie.pattern());
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 20_500, 50);

    let phases: Vec<Phase> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::PhaseChanged { phase, .. } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        [
            Phase::Inhaling,
            Phase::Holding,
            Phase::Exhaling,
            Phase::Inhaling,
            Phase::Holding,
            Phase::Exhaling,
            Phase::Inhaling,
        ]
    );
}

#[test]
fn phase_change_carries_highlighted_edge() {
    let mut session = Session::new(immediate(), Pattern::new(3.0, 4.0, 4.0).unwrap());
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 3_100, 100);

    let edges: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::PhaseChanged { edge, .. } => Some(edge),
            _ => None,
        })
        .collect();
    assert_eq!(edges, ["M 200 230 L 80 30", "M 80 30 L 320 30"]);
}

#[test]
fn pattern_change_rejected_while_running() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    session.start(0);
    session.tick(100);
    assert!(session.change_pattern(Pattern::new(5.0, 5.0, 5.0).unwrap()).is_err());
    assert_eq!(*session.pattern(), Level::Expert.pattern());

    session.stop(200);
    session
        .change_pattern(Pattern::new(5.0, 5.0, 5.0).unwrap())
        .unwrap();
    let edges = &session.triangle().edges;
    assert_eq!(edges[0].nominal_length, edges[1].nominal_length);
}

#[test]
fn ticks_after_stop_are_ignored() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    session.start(0);
    session.tick(100);
    session.stop(1_000);
    let mut rx = session.subscribe();
    assert!(session.tick(1_016).is_none());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.last_stop_reason(), Some(StopReason::User));
}

#[test]
fn hidden_view_reports_elapsed_time() {
    let mut session = Session::new(immediate(), Level::Expert.pattern());
    let mut rx = session.subscribe();
    session.start(0);
    run_frames(&mut session, 0, 7_000, 100);
    session.visibility_changed(true, 7_000);

    let last = drain(&mut rx).pop().unwrap();
    assert_eq!(
        last,
        Event::SessionStopped {
            reason: StopReason::Hidden,
            cycles_completed: 0,
            total_elapsed_ms: 7_000,
        }
    );
}

#[test]
fn manual_clock_stamps_frames() {
    let clock = ManualClock::new(1_000);
    let mut session = Session::new(immediate(), Level::Newbie.pattern());
    session.start(clock.now_ms());

    let mut last = None;
    for _ in 0..625 {
        last = session.tick(clock.advance(16));
    }
    // 10 000 ms after start: exactly one newbie cycle.
    let frame = last.unwrap();
    assert_eq!(clock.now_ms(), 11_000);
    assert_eq!(frame.cycles_completed, 1);
    assert_eq!(frame.phase(), Phase::Inhaling);
    assert_eq!(session.display_value(clock.now_ms()), "00:10");
}
