// Board Input — Button Task
//
// Polls every button at ~100 Hz and feeds transitions into the event
// registry.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::*;
use crate::drivers::button::Button;
use crate::drivers::{DigitalInput, SystemTimer};
use crate::events::EventSink;

pub fn poll<P: DigitalInput>(buttons: &mut [Button<P>], now_ms: u32, events: &dyn EventSink) {
    for button in buttons.iter_mut() {
        button.update(now_ms, events);
    }
}

pub fn button_task<P: DigitalInput, E: EventSink>(
    mut buttons: Vec<Button<P>>,
    events: Arc<E>,
    timer: Arc<dyn SystemTimer>,
) {
    log::info!("Button task started ({} button(s))", buttons.len());

    let poll_interval = Duration::from_millis(BUTTON_POLL_INTERVAL_MS);

    loop {
        poll(&mut buttons, timer.current_time_ms(), events.as_ref());
        thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, EventRegistry, BUTTON_A_ID, BUTTON_B_ID, BUTTON_EVT_CLICK};
    use crate::sim::SimDigitalPin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn clicks_reach_subscribers_of_the_right_button() {
        let events = EventRegistry::new();
        let a = SimDigitalPin::new();
        let b = SimDigitalPin::new();
        let mut buttons = vec![
            Button::new(BUTTON_A_ID, a.clone(), 0),
            Button::new(BUTTON_B_ID, b.clone(), 0),
        ];

        let clicks = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&clicks);
        events.subscribe(
            BUTTON_B_ID,
            BUTTON_EVT_CLICK,
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let mut now = 0;
        for (level, ms) in [(false, 100), (true, 100)] {
            a.set_high(level);
            b.set_high(level);
            for _ in 0..ms / 10 {
                poll(&mut buttons, now, &events);
                now += 10;
            }
        }
        events.dispatch_pending();

        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }
}
