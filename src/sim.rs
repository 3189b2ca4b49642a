// Board Input — Simulated Board
//
// Host runs and tests. Every peripheral shares its state with a `SimBoard`
// handle, so a test can move the accelerometer, change analog levels or
// advance the clock while the hub owns the peripherals themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;

use crate::config::ThermistorCalibration;
use crate::drivers::thermistor::Thermistor;
use crate::drivers::{Accelerometer, AnalogInput, DigitalInput, Platform, SystemTimer};
use crate::metrics::SensingRange;

// ---------------------------------------------------------------------------
// Accelerometer
// ---------------------------------------------------------------------------
#[derive(Debug)]
struct AccelState {
    x: i32,
    y: i32,
    z: i32,
    pitch: i32,
    roll: i32,
    range: SensingRange,
    range_writes: Vec<SensingRange>,
    updates: u32,
}

impl Default for AccelState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            pitch: 0,
            roll: 0,
            range: SensingRange::TwoG,
            range_writes: Vec::new(),
            updates: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct SimAccelerometer {
    state: Arc<Mutex<AccelState>>,
}

impl SimAccelerometer {
    pub fn handle(&self) -> SimAccelerometerHandle {
        SimAccelerometerHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&AccelState) -> T) -> T {
        f(&self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Accelerometer for SimAccelerometer {
    fn update(&mut self) -> anyhow::Result<()> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .updates += 1;
        Ok(())
    }

    fn x(&self) -> i32 {
        self.with(|s| s.x)
    }

    fn y(&self) -> i32 {
        self.with(|s| s.y)
    }

    fn z(&self) -> i32 {
        self.with(|s| s.z)
    }

    fn instantaneous_acceleration_squared(&self) -> u64 {
        self.with(|s| {
            [s.x, s.y, s.z]
                .iter()
                .map(|v| u64::from(v.unsigned_abs()).pow(2))
                .fold(0, u64::saturating_add)
        })
    }

    fn pitch(&self) -> i32 {
        self.with(|s| s.pitch)
    }

    fn roll(&self) -> i32 {
        self.with(|s| s.roll)
    }

    fn range(&self) -> SensingRange {
        self.with(|s| s.range)
    }

    fn set_range(&mut self, range: SensingRange) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.range = range;
        state.range_writes.push(range);
    }
}

/// Test-side view of a [`SimAccelerometer`].
#[derive(Debug, Clone)]
pub struct SimAccelerometerHandle {
    state: Arc<Mutex<AccelState>>,
}

impl SimAccelerometerHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, AccelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_sample(&self, x: i32, y: i32, z: i32) {
        let mut state = self.lock();
        state.x = x;
        state.y = y;
        state.z = z;
    }

    pub fn set_angles(&self, pitch: i32, roll: i32) {
        let mut state = self.lock();
        state.pitch = pitch;
        state.roll = roll;
    }

    /// Change the range behind the hub's back, as a reset of the chip would.
    pub fn force_range(&self, range: SensingRange) {
        self.lock().range = range;
    }

    pub fn range(&self) -> SensingRange {
        self.lock().range
    }

    /// Every range written through [`Accelerometer::set_range`], in order.
    pub fn range_writes(&self) -> Vec<SensingRange> {
        self.lock().range_writes.clone()
    }

    pub fn updates(&self) -> u32 {
        self.lock().updates
    }
}

// ---------------------------------------------------------------------------
// Pins & Clock
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct SimBus;

#[derive(Debug)]
pub struct SimInterruptPin {
    pub pin: i32,
}

#[derive(Debug, Clone)]
pub struct SimAnalogPin {
    pin: i32,
    levels: Arc<Mutex<HashMap<i32, u16>>>,
}

impl AnalogInput for SimAnalogPin {
    fn analog_value(&mut self) -> u16 {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.pin)
            .copied()
            .unwrap_or(0)
    }
}

/// Digital line whose level tests set directly. Starts high (released
/// pull-up).
#[derive(Debug, Clone)]
pub struct SimDigitalPin {
    level: Arc<AtomicBool>,
}

impl SimDigitalPin {
    pub fn new() -> Self {
        Self {
            level: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_high(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }
}

impl Default for SimDigitalPin {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalInput for SimDigitalPin {
    fn is_high(&mut self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: AtomicU32,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u32) {
        // fetch_add wraps, like the hardware counter.
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u32) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl SystemTimer for SimClock {
    fn current_time_ms(&self) -> u32 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPeripheral {
    I2c { sda: i32, scl: i32 },
    InterruptPin(i32),
    Accelerometer,
    AnalogPin(i32),
    Thermometer,
}

/// Test-side handle onto a [`SimPlatform`] and everything it builds.
#[derive(Debug, Clone)]
pub struct SimBoard {
    accelerometer: SimAccelerometerHandle,
    levels: Arc<Mutex<HashMap<i32, u16>>>,
    constructed: Arc<Mutex<Vec<SimPeripheral>>>,
}

impl SimBoard {
    pub fn accelerometer(&self) -> &SimAccelerometerHandle {
        &self.accelerometer
    }

    pub fn set_analog(&self, pin: i32, value: u16) {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pin, value);
    }

    /// Peripherals built so far, in construction order.
    pub fn constructed(&self) -> Vec<SimPeripheral> {
        self.constructed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug)]
pub struct SimPlatform {
    board: SimBoard,
    accelerometer: Option<SimAccelerometer>,
    fail_on: Option<SimPeripheral>,
}

impl SimPlatform {
    pub fn new() -> Self {
        let accelerometer = SimAccelerometer::default();
        Self {
            board: SimBoard {
                accelerometer: accelerometer.handle(),
                levels: Arc::new(Mutex::new(HashMap::new())),
                constructed: Arc::new(Mutex::new(Vec::new())),
            },
            accelerometer: Some(accelerometer),
            fail_on: None,
        }
    }

    /// Make construction of `peripheral` fail.
    pub fn failing_on(mut self, peripheral: SimPeripheral) -> Self {
        self.fail_on = Some(peripheral);
        self
    }

    pub fn board(&self) -> SimBoard {
        self.board.clone()
    }

    fn construct(&self, peripheral: SimPeripheral) -> anyhow::Result<()> {
        if self.fail_on == Some(peripheral) {
            bail!("simulated failure constructing {:?}", peripheral);
        }
        self.board
            .constructed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(peripheral);
        Ok(())
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    type Bus = SimBus;
    type InterruptPin = SimInterruptPin;
    type AnalogPin = SimAnalogPin;
    type Accelerometer = SimAccelerometer;
    type Thermometer = Thermistor<SimAnalogPin>;

    fn i2c(&mut self, sda: i32, scl: i32) -> anyhow::Result<SimBus> {
        self.construct(SimPeripheral::I2c { sda, scl })?;
        Ok(SimBus)
    }

    fn interrupt_pin(&mut self, pin: i32) -> anyhow::Result<SimInterruptPin> {
        self.construct(SimPeripheral::InterruptPin(pin))?;
        Ok(SimInterruptPin { pin })
    }

    fn accelerometer(
        &mut self,
        _bus: SimBus,
        _int1: SimInterruptPin,
    ) -> anyhow::Result<SimAccelerometer> {
        self.construct(SimPeripheral::Accelerometer)?;
        match self.accelerometer.take() {
            Some(acc) => Ok(acc),
            None => bail!("simulated accelerometer already handed out"),
        }
    }

    fn analog_pin(&mut self, pin: i32) -> anyhow::Result<SimAnalogPin> {
        self.construct(SimPeripheral::AnalogPin(pin))?;
        Ok(SimAnalogPin {
            pin,
            levels: Arc::clone(&self.board.levels),
        })
    }

    fn thermometer(
        &mut self,
        pin: SimAnalogPin,
        calibration: ThermistorCalibration,
    ) -> anyhow::Result<Thermistor<SimAnalogPin>> {
        self.construct(SimPeripheral::Thermometer)?;
        Ok(Thermistor::new(pin, calibration))
    }
}
