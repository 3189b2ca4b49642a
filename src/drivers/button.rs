// Board Input — Button Driver
//
// Debounced push button with click, double-click and long-press detection.
// Designed to be polled at ~100 Hz from the button task; every transition is
// raised as an event on the button's own source id. The debounced state is
// published through a `ButtonState` so other tasks can read it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::*;
use crate::drivers::DigitalInput;
use crate::events::*;

/// Read-only view of a button's debounced state, shareable across tasks.
#[derive(Debug, Clone)]
pub struct ButtonState {
    id: u16,
    pressed: Arc<AtomicBool>,
}

impl ButtonState {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

pub struct Button<P> {
    id: u16,
    pin: P,

    // Debounce state
    last_raw: bool,
    last_change_ms: u32,

    // Press tracking
    pressed: Arc<AtomicBool>,
    press_start_ms: u32,

    // Double-click window, opened by a short click
    last_click_ms: Option<u32>,
}

impl<P: DigitalInput> Button<P> {
    /// `pin` is active LOW (pull-up, button to ground).
    pub fn new(id: u16, pin: P, now_ms: u32) -> Self {
        Self {
            id,
            pin,
            last_raw: true, // pull-up → idle HIGH
            last_change_ms: now_ms,
            pressed: Arc::new(AtomicBool::new(false)),
            press_start_ms: now_ms,
            last_click_ms: None,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            id: self.id,
            pressed: Arc::clone(&self.pressed),
        }
    }

    /// Sample the pin and raise any resulting events.
    pub fn update(&mut self, now_ms: u32, events: &dyn EventSink) {
        let current = self.pin.is_high();

        // ---- debounce filter ----
        if current != self.last_raw {
            self.last_raw = current;
            self.last_change_ms = now_ms;
            return;
        }
        if now_ms.wrapping_sub(self.last_change_ms) < DEBOUNCE_MS {
            // Signal still bouncing — wait.
            return;
        }

        let pressed = !current; // active LOW
        let was_pressed = self.is_pressed();

        // ---- button pressed edge ----
        if pressed && !was_pressed {
            self.pressed.store(true, Ordering::Release);
            self.press_start_ms = now_ms;
            events.raise(Event::new(self.id, BUTTON_EVT_DOWN));
        }

        // ---- button released edge ----
        if !pressed && was_pressed {
            self.pressed.store(false, Ordering::Release);
            events.raise(Event::new(self.id, BUTTON_EVT_UP));

            let hold_ms = now_ms.wrapping_sub(self.press_start_ms);
            if hold_ms >= LONG_PRESS_MS {
                events.raise(Event::new(self.id, BUTTON_EVT_LONG_CLICK));
                self.last_click_ms = None;
                return;
            }

            events.raise(Event::new(self.id, BUTTON_EVT_CLICK));
            match self.last_click_ms {
                Some(first) if now_ms.wrapping_sub(first) <= DOUBLE_CLICK_WINDOW_MS => {
                    events.raise(Event::new(self.id, BUTTON_EVT_DOUBLE_CLICK));
                    self.last_click_ms = None;
                }
                _ => self.last_click_ms = Some(now_ms),
            }
        }
    }
}
