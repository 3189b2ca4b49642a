// Board Input — Input Facade
//
// The surface handed to application code. The sensor hub is built the first
// time anything needs it and then lives as long as the `Input`; a failed
// build is permanent and every later call reports it. Buttons stay owned by
// the button task; `Input` only keeps their shared state, keyed by id.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use anyhow::anyhow;

use crate::config::{PinAssignments, ThermistorCalibration};
use crate::drivers::button::{Button, ButtonState};
use crate::drivers::{DigitalInput, Platform, SystemTimer};
use crate::events::{EventBus, Handler, BUTTON_EVT_CLICK};
use crate::gesture::Gesture;
use crate::hub::SensorHub;
use crate::metrics::{Dimension, RotationAxis, SensingRange};

enum Construction<P> {
    Pending(P),
    Done,
    Failed(String),
}

pub struct Input<P: Platform> {
    construction: Mutex<Construction<P>>,
    hub: OnceLock<SensorHub<P>>,
    pins: PinAssignments,
    calibration: ThermistorCalibration,
    events: Arc<dyn EventBus>,
    timer: Arc<dyn SystemTimer>,
    buttons: Mutex<Vec<ButtonState>>,
}

impl<P: Platform> Input<P> {
    /// Input for the board's standard pinout and thermistor.
    pub fn new(platform: P, events: Arc<dyn EventBus>, timer: Arc<dyn SystemTimer>) -> Self {
        Self::with_config(
            platform,
            PinAssignments::default(),
            ThermistorCalibration::default(),
            events,
            timer,
        )
    }

    pub fn with_config(
        platform: P,
        pins: PinAssignments,
        calibration: ThermistorCalibration,
        events: Arc<dyn EventBus>,
        timer: Arc<dyn SystemTimer>,
    ) -> Self {
        Self {
            construction: Mutex::new(Construction::Pending(platform)),
            hub: OnceLock::new(),
            pins,
            calibration,
            events,
            timer,
            buttons: Mutex::new(Vec::new()),
        }
    }

    /// The sensor hub, built on first access.
    pub fn hub(&self) -> anyhow::Result<&SensorHub<P>> {
        if let Some(hub) = self.hub.get() {
            return Ok(hub);
        }

        let mut construction = self
            .construction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Another task may have finished while we waited for the lock.
        if let Some(hub) = self.hub.get() {
            return Ok(hub);
        }

        // Stays `Failed` if building the hub unwinds.
        let placeholder = Construction::Failed("sensor hub construction panicked".into());
        match std::mem::replace(&mut *construction, placeholder) {
            Construction::Pending(mut platform) => {
                match SensorHub::new(&mut platform, &self.pins, self.calibration) {
                    Ok(hub) => {
                        *construction = Construction::Done;
                        Ok(self.hub.get_or_init(|| hub))
                    }
                    Err(e) => {
                        log::error!("Sensor hub construction failed: {:#}", e);
                        *construction = Construction::Failed(format!("{:#}", e));
                        Err(e.context("sensor hub construction failed"))
                    }
                }
            }
            Construction::Failed(reason) => {
                let err = anyhow!("sensor hub unavailable: {}", reason);
                *construction = Construction::Failed(reason);
                Err(err)
            }
            Construction::Done => {
                *construction = Construction::Done;
                Err(anyhow!("sensor hub lost after construction"))
            }
        }
    }

    /// Acceleration in milli-g. With the board flat and screen up:
    /// x = 0, y = 0, z = -1024.
    pub fn acceleration(&self, dimension: Dimension) -> anyhow::Result<i32> {
        Ok(self.hub()?.acceleration(dimension))
    }

    /// Pitch or roll of the board in degrees.
    pub fn rotation(&self, axis: RotationAxis) -> anyhow::Result<i32> {
        Ok(self.hub()?.rotation(axis))
    }

    /// Light falling on the board, in raw ADC units.
    pub fn light_level(&self) -> anyhow::Result<u16> {
        Ok(self.hub()?.light_level())
    }

    /// Temperature in °C.
    pub fn temperature(&self) -> anyhow::Result<i32> {
        Ok(self.hub()?.temperature())
    }

    /// Milliseconds since power on.
    pub fn running_time(&self) -> u32 {
        self.timer.current_time_ms()
    }

    pub fn set_accelerometer_range(&self, range: SensingRange) -> anyhow::Result<()> {
        self.hub()?.set_accelerometer_range(range);
        Ok(())
    }

    /// Run `handler` each time `gesture` is recognised.
    pub fn on_gesture(&self, gesture: Gesture, handler: Handler) -> anyhow::Result<()> {
        self.hub()?.on_gesture(self.events.as_ref(), gesture, handler);
        Ok(())
    }

    /// Make `button`'s state visible through [`Input::is_button_pressed`].
    /// The button itself can then move into the task that polls it.
    pub fn attach_button<Q: DigitalInput>(&self, button: &Button<Q>) {
        let state = button.state();
        let mut buttons = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
        buttons.retain(|b| b.id() != state.id());
        buttons.push(state);
    }

    /// Run `handler` each time the button with id `button_id` is clicked.
    pub fn on_button_pressed(&self, button_id: u16, handler: Handler) {
        self.events.subscribe(button_id, BUTTON_EVT_CLICK, handler);
    }

    /// Debounced state of an attached button. Unknown ids read as released.
    pub fn is_button_pressed(&self, button_id: u16) -> bool {
        self.buttons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| b.id() == button_id)
            .is_some_and(ButtonState::is_pressed)
    }
}
