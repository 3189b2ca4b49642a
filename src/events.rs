// Board Input — Event Sources, Codes & Registry
//
// Events are (source id, event code) pairs. Drivers raise them from any task;
// the dispatch loop delivers them to every listener whose filter matches.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};

// ---------------------------------------------------------------------------
// Source IDs
// ---------------------------------------------------------------------------
/// Wildcard source id for listeners.
pub const ANY_SOURCE: u16 = 0;
pub const BUTTON_A_ID: u16 = 1;
pub const BUTTON_B_ID: u16 = 2;
pub const GESTURE_ID: u16 = 27;

// ---------------------------------------------------------------------------
// Event Codes
// ---------------------------------------------------------------------------
/// Wildcard event code for listeners.
pub const ANY_EVENT: u16 = 0;

pub const BUTTON_EVT_DOWN: u16 = 1;
pub const BUTTON_EVT_UP: u16 = 2;
pub const BUTTON_EVT_CLICK: u16 = 3;
pub const BUTTON_EVT_LONG_CLICK: u16 = 4;
pub const BUTTON_EVT_DOUBLE_CLICK: u16 = 6;

pub const ACCELEROMETER_EVT_TILT_UP: u16 = 1;
pub const ACCELEROMETER_EVT_TILT_DOWN: u16 = 2;
pub const ACCELEROMETER_EVT_TILT_LEFT: u16 = 3;
pub const ACCELEROMETER_EVT_TILT_RIGHT: u16 = 4;
pub const ACCELEROMETER_EVT_FACE_UP: u16 = 5;
pub const ACCELEROMETER_EVT_FACE_DOWN: u16 = 6;
pub const ACCELEROMETER_EVT_FREEFALL: u16 = 7;
pub const ACCELEROMETER_EVT_3G: u16 = 8;
pub const ACCELEROMETER_EVT_6G: u16 = 9;
pub const ACCELEROMETER_EVT_8G: u16 = 10;
pub const ACCELEROMETER_EVT_SHAKE: u16 = 11;

// ---------------------------------------------------------------------------
// Events & Handlers
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub source: u16,
    pub value: u16,
}

impl Event {
    pub fn new(source: u16, value: u16) -> Self {
        Self { source, value }
    }
}

/// User code run when a subscribed event occurs.
pub type Handler = Box<dyn FnMut() + Send + 'static>;

/// Subscription side of the event runtime.
pub trait EventBus: Send + Sync {
    /// Run `handler` once for every later event from `source` with code
    /// `value`. Subscriptions live as long as the bus.
    fn subscribe(&self, source: u16, value: u16, handler: Handler);
}

/// Anything that drivers can raise events into.
pub trait EventSink {
    fn raise(&self, event: Event);
}

struct Listener {
    source: u16,
    value: u16,
    handler: Arc<Mutex<Handler>>,
}

impl Listener {
    fn matches(&self, event: Event) -> bool {
        (self.source == ANY_SOURCE || self.source == event.source)
            && (self.value == ANY_EVENT || self.value == event.value)
    }
}

/// In-process event runtime: a listener table plus a queue drained by the
/// dispatch loop.
pub struct EventRegistry {
    listeners: Mutex<Vec<Listener>>,
    tx: Sender<Event>,
    rx: Mutex<Receiver<Event>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            listeners: Mutex::new(Vec::new()),
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver every queued event. Returns the number of handlers run.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self
                .rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .try_recv();
            match next {
                Ok(event) => delivered += self.deliver(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Dispatch loop: block on the queue and deliver events as they arrive.
    /// The queue lock is released before handlers run, so a handler may call
    /// [`EventRegistry::dispatch_pending`].
    pub fn run(&self) {
        log::info!("Event dispatch loop started");
        // The registry owns a sender, so the queue never disconnects while
        // `self` is alive.
        loop {
            let next = self
                .rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();
            match next {
                Ok(event) => {
                    self.deliver(event);
                }
                Err(_) => break,
            }
        }
    }

    fn deliver(&self, event: Event) -> usize {
        // Handlers may subscribe or raise; never call them with the table locked.
        let handlers: Vec<Arc<Mutex<Handler>>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.matches(event))
            .map(|l| Arc::clone(&l.handler))
            .collect();

        log::debug!(
            "Event {}:{} → {} handler(s)",
            event.source,
            event.value,
            handlers.len()
        );

        for handler in &handlers {
            let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
            (*handler)();
        }
        handlers.len()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for EventRegistry {
    fn subscribe(&self, source: u16, value: u16, handler: Handler) {
        log::debug!("Subscribed to {}:{}", source, value);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Listener {
                source,
                value,
                handler: Arc::new(Mutex::new(handler)),
            });
    }
}

impl EventSink for EventRegistry {
    fn raise(&self, event: Event) {
        // Cannot fail: the receiver lives in `self`.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn events_wait_for_dispatch() {
        let registry = EventRegistry::new();
        let (count, handler) = counter();
        registry.subscribe(GESTURE_ID, ACCELEROMETER_EVT_SHAKE, handler);

        registry.raise(Event::new(GESTURE_ID, ACCELEROMETER_EVT_SHAKE));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert_eq!(registry.dispatch_pending(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.dispatch_pending(), 0);
    }

    #[test]
    fn only_matching_listeners_run() {
        let registry = EventRegistry::new();
        let (shake, shake_handler) = counter();
        let (button, button_handler) = counter();
        registry.subscribe(GESTURE_ID, ACCELEROMETER_EVT_SHAKE, shake_handler);
        registry.subscribe(BUTTON_A_ID, BUTTON_EVT_CLICK, button_handler);

        registry.raise(Event::new(GESTURE_ID, ACCELEROMETER_EVT_FREEFALL));
        registry.raise(Event::new(BUTTON_A_ID, BUTTON_EVT_CLICK));
        registry.raise(Event::new(BUTTON_B_ID, BUTTON_EVT_CLICK));
        registry.dispatch_pending();

        assert_eq!(shake.load(Ordering::SeqCst), 0);
        assert_eq!(button.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wildcards_match_everything_on_their_axis() {
        let registry = EventRegistry::new();
        let (any_gesture, handler) = counter();
        registry.subscribe(GESTURE_ID, ANY_EVENT, handler);
        let (any_click, handler) = counter();
        registry.subscribe(ANY_SOURCE, BUTTON_EVT_CLICK, handler);

        registry.raise(Event::new(GESTURE_ID, ACCELEROMETER_EVT_3G));
        registry.raise(Event::new(GESTURE_ID, ACCELEROMETER_EVT_TILT_UP));
        registry.raise(Event::new(BUTTON_B_ID, BUTTON_EVT_CLICK));
        registry.dispatch_pending();

        assert_eq!(any_gesture.load(Ordering::SeqCst), 2);
        // Gesture code 3 (tilt left) would also match; none was raised.
        assert_eq!(any_click.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_subscription_runs_once_per_event() {
        let registry = EventRegistry::new();
        let (count, first) = counter();
        let c = Arc::clone(&count);
        registry.subscribe(BUTTON_A_ID, BUTTON_EVT_CLICK, first);
        registry.subscribe(
            BUTTON_A_ID,
            BUTTON_EVT_CLICK,
            Box::new(move || {
                c.fetch_add(10, Ordering::SeqCst);
            }),
        );

        registry.raise(Event::new(BUTTON_A_ID, BUTTON_EVT_CLICK));
        assert_eq!(registry.dispatch_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 11);
        assert_eq!(registry.listener_count(), 2);
    }

    #[test]
    fn handlers_under_the_dispatch_loop_can_drain_the_queue() {
        let registry = Arc::new(EventRegistry::new());
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        let weak = Arc::downgrade(&registry);
        registry.subscribe(
            BUTTON_A_ID,
            BUTTON_EVT_LONG_CLICK,
            Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.dispatch_pending();
                }
                let _ = done_tx.send(());
            }),
        );

        let looping = Arc::clone(&registry);
        std::thread::spawn(move || looping.run());
        registry.raise(Event::new(BUTTON_A_ID, BUTTON_EVT_LONG_CLICK));

        assert!(done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .is_ok());
    }

    #[test]
    fn handlers_can_raise_follow_up_events() {
        let registry = Arc::new(EventRegistry::new());
        let (count, handler) = counter();
        registry.subscribe(BUTTON_B_ID, BUTTON_EVT_UP, handler);

        let weak = Arc::downgrade(&registry);
        registry.subscribe(
            BUTTON_B_ID,
            BUTTON_EVT_DOWN,
            Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.raise(Event::new(BUTTON_B_ID, BUTTON_EVT_UP));
                }
            }),
        );

        registry.raise(Event::new(BUTTON_B_ID, BUTTON_EVT_DOWN));
        assert_eq!(registry.dispatch_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
