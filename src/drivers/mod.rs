// Board Input — Peripheral Bindings
//
// The hub only talks to hardware through these traits. The ESP-IDF platform
// implements them for the real board; `crate::sim` implements them for tests
// and host runs.

pub mod button;
#[cfg(target_os = "espidf")]
pub mod esp;
pub mod lis3dh;
pub mod thermistor;

use crate::config::ThermistorCalibration;
use crate::metrics::SensingRange;

/// 3-axis accelerometer with a cached sample.
pub trait Accelerometer {
    /// Read a fresh sample from the device into the cache.
    fn update(&mut self) -> anyhow::Result<()>;

    /// Cached X acceleration in milli-g.
    fn x(&self) -> i32;
    /// Cached Y acceleration in milli-g.
    fn y(&self) -> i32;
    /// Cached Z acceleration in milli-g.
    fn z(&self) -> i32;

    /// Squared magnitude of the cached sample, in milli-g². Saturates rather
    /// than overflowing.
    fn instantaneous_acceleration_squared(&self) -> u64;

    /// Tilt about the X axis in degrees.
    fn pitch(&self) -> i32;
    /// Tilt about the Y axis in degrees.
    fn roll(&self) -> i32;

    fn range(&self) -> SensingRange;

    /// Configure the measurement range. A range the device cannot provide
    /// leaves the current one in place.
    fn set_range(&mut self, range: SensingRange);
}

/// Raw analog input (ADC channel).
pub trait AnalogInput {
    fn analog_value(&mut self) -> u16;
}

/// Digital input pin; `true` means the line is high.
pub trait DigitalInput {
    fn is_high(&mut self) -> bool;
}

pub trait Thermometer {
    /// Current temperature in whole degrees Celsius.
    fn temperature(&mut self) -> i32;
}

/// Milliseconds since the system timer started. Wraps on overflow.
pub trait SystemTimer: Send + Sync {
    fn current_time_ms(&self) -> u32;
}

/// Constructors for every peripheral the hub owns, keyed by pin number.
///
/// The hub calls these exactly once each, in a fixed order; a failing
/// constructor aborts hub construction.
pub trait Platform {
    type Bus;
    type InterruptPin;
    type AnalogPin: AnalogInput + Send;
    type Accelerometer: Accelerometer + Send;
    type Thermometer: Thermometer + Send;

    fn i2c(&mut self, sda: i32, scl: i32) -> anyhow::Result<Self::Bus>;

    fn interrupt_pin(&mut self, pin: i32) -> anyhow::Result<Self::InterruptPin>;

    fn accelerometer(
        &mut self,
        bus: Self::Bus,
        int1: Self::InterruptPin,
    ) -> anyhow::Result<Self::Accelerometer>;

    fn analog_pin(&mut self, pin: i32) -> anyhow::Result<Self::AnalogPin>;

    fn thermometer(
        &mut self,
        pin: Self::AnalogPin,
        calibration: ThermistorCalibration,
    ) -> anyhow::Result<Self::Thermometer>;
}
