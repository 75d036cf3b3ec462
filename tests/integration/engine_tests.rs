//! Integration tests for the ReconciliationEngine → registry → actuator
//! pipeline, driven tick by tick through scripted lanes.

use gatekeeper::app::commands::GateCommand;
use gatekeeper::app::events::GateEvent;
use gatekeeper::app::service::{LaneOutcome, ReconciliationEngine};
use gatekeeper::config::SystemConfig;
use gatekeeper::error::{Notice, RejectReason};
use gatekeeper::model::{CardToken, Lane};

use super::mock_hw::{MockGate, RecordingSink, Step, TagRecognizer, at_ms};

fn make_engine(config: SystemConfig) -> (ReconciliationEngine, MockGate, RecordingSink) {
    let mut engine = ReconciliationEngine::new(&config);
    let mut sink = RecordingSink::new();
    engine.start(&mut sink);
    (engine, MockGate::new(), sink)
}

fn with_capacity(capacity: usize) -> SystemConfig {
    SystemConfig {
        capacity,
        ..SystemConfig::default()
    }
}

fn card(s: &str) -> CardToken {
    CardToken::parse(s).unwrap()
}

// ── Capacity exhaustion ──────────────────────────────────────

#[test]
fn full_lot_rejects_second_vehicle() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(1));

    hw.script(Lane::Entry, Step::swipe("51A-12345", "C1"));
    let report = engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    assert!(matches!(report.entry, LaneOutcome::Admitted(_)));
    assert_eq!(engine.registry().free(), 0);

    hw.script(Lane::Entry, Step::swipe("51A-99999", "C2"));
    let report = engine.tick(at_ms(100), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(report.entry, LaneOutcome::Rejected(RejectReason::NoCapacity));
    assert_eq!(engine.registry().free(), 0);
    assert_eq!(hw.opened, [Lane::Entry], "a rejected vehicle must not open the gate");
}

// ── Debounce ─────────────────────────────────────────────────

#[test]
fn repeated_swipe_inside_cooldown_is_suppressed() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    sink.clear();

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(2_000), &mut hw, &mut TagRecognizer, &mut sink);

    assert_eq!(report.entry, LaneOutcome::Suppressed(card("C1")));
    assert_eq!(engine.registry().occupied(), 1);
    assert!(
        !sink
            .events()
            .any(|e| matches!(e, GateEvent::Rejected { .. } | GateEvent::Admitted { .. })),
        "a suppressed swipe must leave no decision trace"
    );
}

#[test]
fn repeated_swipe_after_cooldown_reaches_the_registry() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(5_000), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(report.entry, LaneOutcome::Rejected(RejectReason::DuplicateCard));
    assert_eq!(engine.registry().occupied(), 1);
}

#[test]
fn lanes_debounce_independently() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    // Same card one second later, but on the other lane.
    hw.script(Lane::Exit, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(1_000), &mut hw, &mut TagRecognizer, &mut sink);
    assert!(matches!(report.exit, LaneOutcome::Released(_)));
}

#[test]
fn plate_announcements_follow_debounce_setting() {
    for (debounce_plates, expected) in [(true, 1), (false, 3)] {
        let config = SystemConfig {
            debounce_plates,
            ..SystemConfig::default()
        };
        let (mut engine, mut hw, mut sink) = make_engine(config);
        for i in 0..3 {
            hw.script(Lane::Entry, Step::plate("P1"));
            engine.tick(at_ms(i * 100), &mut hw, &mut TagRecognizer, &mut sink);
        }
        let reads = sink
            .events()
            .filter(|e| matches!(e, GateEvent::PlateRead { .. }))
            .count();
        assert_eq!(reads, expected, "debounce_plates={}", debounce_plates);
    }
}

// ── Release ──────────────────────────────────────────────────

#[test]
fn release_frees_slot_and_second_release_is_not_found() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(engine.registry().free(), 9);

    hw.script(Lane::Exit, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(60_000), &mut hw, &mut TagRecognizer, &mut sink);
    let LaneOutcome::Released(departure) = report.exit.clone() else {
        panic!("expected release, got {:?}", report.exit);
    };
    assert_eq!(departure.plate.as_str(), "P1");
    assert_eq!(departure.entry_time, at_ms(0));
    assert_eq!(departure.exit_time, at_ms(60_000));
    assert_eq!(engine.registry().free(), 10);

    hw.script(Lane::Exit, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(120_000), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(report.exit, LaneOutcome::Rejected(RejectReason::NotFound));
    assert_eq!(engine.registry().free(), 10);
}

#[test]
fn exit_of_unknown_plate_is_rejected() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Exit, Step::swipe("GHOST", "C9"));
    let report = engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(report.exit, LaneOutcome::Rejected(RejectReason::NotFound));
    assert!(hw.opened.is_empty());
}

#[test]
fn exit_releases_by_plate_whatever_card_is_shown() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    hw.script(Lane::Exit, Step::swipe("P1", "C7"));
    let report = engine.tick(at_ms(100), &mut hw, &mut TagRecognizer, &mut sink);
    assert!(matches!(report.exit, LaneOutcome::Released(_)));
}

#[test]
fn duplicate_plate_under_new_card_is_rejected() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    hw.script(Lane::Entry, Step::swipe("P1", "C2"));
    let report = engine.tick(at_ms(100), &mut hw, &mut TagRecognizer, &mut sink);
    assert_eq!(report.entry, LaneOutcome::Rejected(RejectReason::DuplicatePlate));
}

// ── Device faults ────────────────────────────────────────────

#[test]
fn absent_entry_frame_does_not_block_exit_lane() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    hw.script(
        Lane::Entry,
        Step {
            plate: None,
            card: None,
        },
    );
    hw.script(Lane::Exit, Step::swipe("P1", "C1"));
    let report = engine.tick(at_ms(1_000), &mut hw, &mut TagRecognizer, &mut sink);

    assert_eq!(report.entry, LaneOutcome::Idle);
    assert!(matches!(report.exit, LaneOutcome::Released(_)));
    assert_eq!(hw.opened, [Lane::Entry, Lane::Exit]);
}

#[test]
fn swipe_without_plate_is_a_notice() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::no_camera("C1"));
    let report = engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    assert_eq!(
        report.entry,
        LaneOutcome::Skipped(Notice::RecognitionUnavailable)
    );
    assert!(sink.events().any(|e| matches!(
        e,
        GateEvent::Notice {
            notice: Notice::RecognitionUnavailable,
            ..
        }
    )));
    assert_eq!(engine.registry().occupied(), 0);
    assert!(hw.opened.is_empty());
}

// ── Side effects ─────────────────────────────────────────────

#[test]
fn every_tick_feeds_both_lanes() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));
    sink.clear();

    for i in 0..4 {
        engine.tick(at_ms(i * 100), &mut hw, &mut TagRecognizer, &mut sink);
    }
    let frames = sink
        .events()
        .filter(|e| matches!(e, GateEvent::LaneFrame { .. }))
        .count();
    assert_eq!(frames, 8);
    assert_eq!(engine.tick_count(), 4);
}

#[test]
fn admission_and_release_persist_evidence() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    hw.script(Lane::Exit, Step::swipe("P1", "C1"));
    engine.tick(at_ms(1_000), &mut hw, &mut TagRecognizer, &mut sink);

    let stems: Vec<String> = sink.persisted().iter().map(|s| s.file_stem()).collect();
    assert_eq!(
        stems,
        [
            "P1_entry_2024-01-15 08-00-00",
            "P1_exit_2024-01-15 08-00-01"
        ]
    );
}

#[test]
fn free_count_in_feed_reflects_commit() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(2));
    sink.clear();

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    let entry_free = sink.events().find_map(|e| match e {
        GateEvent::LaneFrame {
            lane: Lane::Entry,
            free,
            ..
        } => Some(*free),
        _ => None,
    });
    assert_eq!(entry_free, Some(1));
}

// ── Operator commands ────────────────────────────────────────

#[test]
fn manual_open_leaves_registry_untouched() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    engine
        .handle_command(GateCommand::ManualOpen(Lane::Exit), at_ms(0), &mut hw, &mut sink)
        .unwrap();

    assert_eq!(hw.opened, [Lane::Exit]);
    assert_eq!(engine.registry().occupied(), 0);
    assert!(sink.events().any(|e| matches!(
        e,
        GateEvent::GateOpened {
            lane: Lane::Exit,
            manual: true
        }
    )));
}

#[test]
fn evicted_card_can_enter_again_immediately() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));

    hw.script(Lane::Entry, Step::swipe("P1", "C1"));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);

    engine
        .handle_command(GateCommand::EvictCard(card("C1")), at_ms(500), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(engine.registry().occupied(), 0);
    assert_eq!(engine.snapshot().departures.len(), 1);

    hw.script(Lane::Entry, Step::swipe("P2", "C1"));
    let report = engine.tick(at_ms(1_000), &mut hw, &mut TagRecognizer, &mut sink);
    assert!(matches!(report.entry, LaneOutcome::Admitted(_)));
}

#[test]
fn evicting_unknown_card_is_rejected() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(10));
    let err = engine
        .handle_command(GateCommand::EvictCard(card("C404")), at_ms(0), &mut hw, &mut sink)
        .unwrap_err();
    assert_eq!(err.reason, RejectReason::NotFound);
}

// ── Lifecycle ────────────────────────────────────────────────

#[test]
fn start_and_shutdown_bracket_the_event_stream() {
    let (mut engine, mut hw, mut sink) = make_engine(with_capacity(3));
    engine.tick(at_ms(0), &mut hw, &mut TagRecognizer, &mut sink);
    engine.shutdown(&mut sink);

    let events: Vec<_> = sink.events().collect();
    assert!(matches!(events.first(), Some(GateEvent::Started { capacity: 3 })));
    assert!(matches!(events.last(), Some(GateEvent::Stopped { ticks: 1 })));
}
