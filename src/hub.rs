// Board Input — Sensor Hub
//
// Sole owner of the board's sensing peripherals. All peripheral state,
// including the accelerometer's sensing range, sits behind one lock, so range
// checks and changes from different tasks cannot interleave.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Context;

use crate::config::{PinAssignments, ThermistorCalibration};
use crate::drivers::{Accelerometer, AnalogInput, Platform, Thermometer};
use crate::events::{EventBus, Handler, GESTURE_ID};
use crate::gesture::{self, Gesture};
use crate::metrics::{self, Dimension, RotationAxis, SensingRange};

struct Devices<P: Platform> {
    accelerometer: P::Accelerometer,
    thermometer: P::Thermometer,
    light: P::AnalogPin,
}

pub struct SensorHub<P: Platform> {
    devices: Mutex<Devices<P>>,
}

impl<P: Platform> SensorHub<P> {
    /// Build every peripheral in board order. Any failure is fatal for the
    /// hub; nothing built so far is kept.
    pub fn new(
        platform: &mut P,
        pins: &PinAssignments,
        calibration: ThermistorCalibration,
    ) -> anyhow::Result<Self> {
        let bus = platform
            .i2c(pins.accelerometer_sda, pins.accelerometer_scl)
            .context("accelerometer I2C bus")?;
        let int1 = platform
            .interrupt_pin(pins.accelerometer_int)
            .context("accelerometer interrupt pin")?;
        let accelerometer = platform
            .accelerometer(bus, int1)
            .context("accelerometer")?;

        let temperature_pin = platform
            .analog_pin(pins.temperature)
            .context("temperature pin")?;
        let thermometer = platform
            .thermometer(temperature_pin, calibration)
            .context("thermometer")?;

        let light = platform.analog_pin(pins.light).context("light sensor pin")?;

        log::info!(
            "Sensor hub ready (accelerometer at {}, thermistor GPIO{}, light GPIO{})",
            accelerometer.range(),
            pins.temperature,
            pins.light
        );

        Ok(Self {
            devices: Mutex::new(Devices {
                accelerometer,
                thermometer,
                light,
            }),
        })
    }

    fn devices(&self) -> MutexGuard<'_, Devices<P>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acceleration in milli-g. With the board flat and screen up:
    /// x = 0, y = 0, z = -1024.
    pub fn acceleration(&self, dimension: Dimension) -> i32 {
        metrics::acceleration(&self.devices().accelerometer, dimension)
    }

    /// Pitch or roll in degrees.
    pub fn rotation(&self, axis: RotationAxis) -> i32 {
        metrics::rotation(&self.devices().accelerometer, axis)
    }

    /// Raw ADC reading of the light sensor.
    pub fn light_level(&self) -> u16 {
        self.devices().light.analog_value()
    }

    /// Temperature in °C.
    pub fn temperature(&self) -> i32 {
        self.devices().thermometer.temperature()
    }

    pub fn accelerometer_range(&self) -> SensingRange {
        self.devices().accelerometer.range()
    }

    pub fn set_accelerometer_range(&self, range: SensingRange) {
        log::info!("Accelerometer range {} requested", range);
        self.devices().accelerometer.set_range(range);
    }

    /// Pull a fresh sample from the accelerometer.
    pub fn refresh(&self) -> anyhow::Result<()> {
        self.devices().accelerometer.update()
    }

    /// Run `handler` whenever `gesture` is recognised, widening the sensing
    /// range first if the gesture needs it.
    pub fn on_gesture<E: EventBus + ?Sized>(&self, events: &E, gesture: Gesture, handler: Handler) {
        {
            let mut devices = self.devices();
            gesture::ensure_range(&mut devices.accelerometer, gesture);
        }
        events.subscribe(GESTURE_ID, gesture.code(), handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventRegistry;
    use crate::sim::{SimPeripheral, SimPlatform};

    fn hub() -> (SensorHub<SimPlatform>, crate::sim::SimBoard) {
        let mut platform = SimPlatform::new();
        let board = platform.board();
        let hub = SensorHub::new(
            &mut platform,
            &PinAssignments::default(),
            ThermistorCalibration::default(),
        )
        .unwrap();
        (hub, board)
    }

    #[test]
    fn peripherals_are_built_in_board_order() {
        let (_hub, board) = hub();
        let pins = PinAssignments::default();
        assert_eq!(
            board.constructed(),
            vec![
                SimPeripheral::I2c {
                    sda: pins.accelerometer_sda,
                    scl: pins.accelerometer_scl
                },
                SimPeripheral::InterruptPin(pins.accelerometer_int),
                SimPeripheral::Accelerometer,
                SimPeripheral::AnalogPin(pins.temperature),
                SimPeripheral::Thermometer,
                SimPeripheral::AnalogPin(pins.light),
            ]
        );
    }

    #[test]
    fn failure_names_the_peripheral() {
        let mut platform = SimPlatform::new().failing_on(SimPeripheral::Thermometer);
        let board = platform.board();
        let err = SensorHub::new(
            &mut platform,
            &PinAssignments::default(),
            ThermistorCalibration::default(),
        )
        .err()
        .unwrap();

        assert_eq!(err.to_string(), "thermometer");
        // Construction stops at the failing step.
        assert!(!board
            .constructed()
            .contains(&SimPeripheral::AnalogPin(PinAssignments::default().light)));
    }

    #[test]
    fn readings_come_from_owned_peripherals() {
        let (hub, board) = hub();
        let pins = PinAssignments::default();
        board.accelerometer().set_sample(3, -4, 0);
        board.set_analog(pins.light, 812);
        board.set_analog(pins.temperature, 2048);

        assert_eq!(hub.acceleration(Dimension::Y), -4);
        assert_eq!(hub.acceleration(Dimension::Strength), 5);
        assert_eq!(hub.light_level(), 812);
        assert_eq!(hub.temperature(), 25);
    }

    #[test]
    fn refresh_updates_accelerometer() {
        let (hub, board) = hub();
        hub.refresh().unwrap();
        hub.refresh().unwrap();
        assert_eq!(board.accelerometer().updates(), 2);
    }

    #[test]
    fn explicit_range_can_narrow() {
        let (hub, _board) = hub();
        hub.set_accelerometer_range(SensingRange::EightG);
        hub.set_accelerometer_range(SensingRange::OneG);
        assert_eq!(hub.accelerometer_range(), SensingRange::OneG);
    }

    #[test]
    fn gesture_subscription_escalates_before_registering() {
        let (hub, _board) = hub();
        let events = EventRegistry::new();

        hub.on_gesture(&events, Gesture::SixG, Box::new(|| {}));

        assert_eq!(hub.accelerometer_range(), SensingRange::EightG);
        assert_eq!(events.listener_count(), 1);
    }
}
