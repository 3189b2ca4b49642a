use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use board_input::events::{Event, EventSink, GESTURE_ID};
use board_input::sim::{SimBoard, SimClock, SimPlatform};
use board_input::{EventRegistry, Gesture, Input, SensingRange};

fn fresh() -> (Input<SimPlatform>, SimBoard, Arc<EventRegistry>) {
    let platform = SimPlatform::new();
    let board = platform.board();
    let events = Arc::new(EventRegistry::new());
    let input = Input::new(platform, events.clone(), Arc::new(SimClock::new()));
    (input, board, events)
}

fn range(input: &Input<SimPlatform>) -> SensingRange {
    input.hub().unwrap().accelerometer_range()
}

fn noop() -> board_input::Handler {
    Box::new(|| {})
}

#[test]
fn shock_subscriptions_step_the_range_up() {
    let (input, board, _) = fresh();
    assert_eq!(range(&input), SensingRange::TwoG);

    input.on_gesture(Gesture::ThreeG, noop()).unwrap();
    assert_eq!(range(&input), SensingRange::FourG);

    input.on_gesture(Gesture::Shake, noop()).unwrap();
    assert_eq!(range(&input), SensingRange::FourG);

    input.on_gesture(Gesture::SixG, noop()).unwrap();
    assert_eq!(range(&input), SensingRange::EightG);

    assert_eq!(
        board.accelerometer().range_writes(),
        vec![SensingRange::FourG, SensingRange::EightG]
    );
}

#[test]
fn eight_g_is_never_given_back() {
    let (input, board, _) = fresh();
    input.on_gesture(Gesture::EightG, noop()).unwrap();

    for gesture in Gesture::ALL {
        input.on_gesture(gesture, noop()).unwrap();
        assert_eq!(range(&input), SensingRange::EightG);
    }
    assert_eq!(board.accelerometer().range_writes(), vec![SensingRange::EightG]);
}

#[test]
fn range_never_drops_across_subscription_sequences() {
    // Every ordered pair of gestures from every starting range.
    for start in SensingRange::ALL {
        for first in Gesture::ALL {
            for second in Gesture::ALL {
                let (input, board, _) = fresh();
                board.accelerometer().force_range(start);

                let mut previous = range(&input);
                let mut required = 0;
                for gesture in [first, second] {
                    input.on_gesture(gesture, noop()).unwrap();
                    let now = range(&input);
                    assert!(now >= previous, "{:?} lowered {} to {}", gesture, previous, now);
                    previous = now;
                    if let Some(req) = gesture.range_requirement() {
                        required = required.max(req.minimum_g);
                    }
                }
                assert!(previous.g() >= required, "{} < {}g", previous, required);
            }
        }
    }
}

#[test]
fn escalation_skips_the_bare_minimum() {
    for start in [SensingRange::OneG, SensingRange::TwoG] {
        let (input, board, _) = fresh();
        board.accelerometer().force_range(start);
        input.on_gesture(Gesture::ThreeG, noop()).unwrap();
        assert_eq!(range(&input), SensingRange::FourG);
    }

    for gesture in [Gesture::SixG, Gesture::EightG] {
        for start in [SensingRange::OneG, SensingRange::TwoG, SensingRange::FourG] {
            let (input, board, _) = fresh();
            board.accelerometer().force_range(start);
            input.on_gesture(gesture, noop()).unwrap();
            assert_eq!(range(&input), SensingRange::EightG);
        }
    }
}

#[test]
fn explicit_range_then_gesture_escalates_again() {
    let (input, _, _) = fresh();
    input.on_gesture(Gesture::SixG, noop()).unwrap();
    input.set_accelerometer_range(SensingRange::OneG).unwrap();
    assert_eq!(range(&input), SensingRange::OneG);

    input.on_gesture(Gesture::ThreeG, noop()).unwrap();
    assert_eq!(range(&input), SensingRange::FourG);
}

#[test]
fn every_subscription_is_delivered() {
    let (input, _, events) = fresh();
    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let c = Arc::clone(&count);
        input
            .on_gesture(
                Gesture::ThreeG,
                Box::new(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
    }

    events.raise(Event::new(GESTURE_ID, Gesture::ThreeG.code()));
    assert_eq!(events.dispatch_pending(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_subscriptions_end_at_the_widest_range() {
    let (input, _, events) = fresh();
    let input = Arc::new(input);

    let threads: Vec<_> = [Gesture::ThreeG, Gesture::SixG, Gesture::Shake, Gesture::EightG]
        .into_iter()
        .cycle()
        .take(16)
        .map(|gesture| {
            let input = Arc::clone(&input);
            std::thread::spawn(move || input.on_gesture(gesture, Box::new(|| {})).unwrap())
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(range(&input), SensingRange::EightG);
    assert_eq!(events.listener_count(), 16);
}
