// Board Input — ESP-IDF Platform
//
// Real peripherals for the ESP32-C3 board: I2C0 for the LIS3DH, GPIO inputs,
// ADC1 one-shot channels for the thermistor and the photodiode, and the
// esp_timer system clock.

use std::sync::Arc;

use anyhow::{bail, Context};
use esp_idf_hal::gpio::{AnyIOPin, Input, Pin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver, I2C0};
use esp_idf_hal::prelude::*;

use crate::config::*;
use crate::drivers::lis3dh::Lis3dh;
use crate::drivers::thermistor::Thermistor;
use crate::drivers::{AnalogInput, DigitalInput, Platform, SystemTimer};

pub type EspInputPin = PinDriver<'static, AnyIOPin, Input>;
pub type EspAccelerometer = Lis3dh<I2cDriver<'static>, EspInputPin>;

// ---------------------------------------------------------------------------
// System timer
// ---------------------------------------------------------------------------
pub struct EspTimer;

impl SystemTimer for EspTimer {
    /// Milliseconds since boot (wraps at ~49 days).
    fn current_time_ms(&self) -> u32 {
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
    }
}

// ---------------------------------------------------------------------------
// GPIO
// ---------------------------------------------------------------------------
impl<T: Pin> DigitalInput for PinDriver<'_, T, Input> {
    fn is_high(&mut self) -> bool {
        PinDriver::is_high(self)
    }
}

/// Active-low button input with the internal pull-up enabled.
pub fn button_pin(pin: i32) -> anyhow::Result<EspInputPin> {
    // SAFETY: each button GPIO is claimed exactly once, at boot.
    let mut driver = PinDriver::input(unsafe { AnyIOPin::new(pin) })
        .with_context(|| format!("button GPIO{}", pin))?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

// ---------------------------------------------------------------------------
// ADC (raw ESP-IDF one-shot API)
// ---------------------------------------------------------------------------
struct AdcUnit(esp_idf_sys::adc_oneshot_unit_handle_t);

// SAFETY: the handle is only used through `EspAnalogPin`s, which the hub
// keeps behind its device lock.
unsafe impl Send for AdcUnit {}
unsafe impl Sync for AdcUnit {}

impl AdcUnit {
    fn new() -> anyhow::Result<Self> {
        let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
            unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
            ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..unsafe { core::mem::zeroed() }
        };
        let ret = unsafe { esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle) };
        if ret != esp_idf_sys::ESP_OK {
            bail!("ADC unit init failed ({})", ret);
        }
        Ok(Self(handle))
    }
}

impl Drop for AdcUnit {
    fn drop(&mut self) {
        unsafe {
            esp_idf_sys::adc_oneshot_del_unit(self.0);
        }
    }
}

pub struct EspAnalogPin {
    unit: Arc<AdcUnit>,
    channel: esp_idf_sys::adc_channel_t,
    last: u16,
}

impl AnalogInput for EspAnalogPin {
    fn analog_value(&mut self) -> u16 {
        let mut raw: i32 = 0;
        let ret = unsafe { esp_idf_sys::adc_oneshot_read(self.unit.0, self.channel, &mut raw) };
        if ret == esp_idf_sys::ESP_OK {
            self.last = raw.clamp(0, i32::from(ADC_MAX_READING)) as u16;
        } else {
            log::warn!("ADC read on channel {} failed ({})", self.channel, ret);
        }
        self.last
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------
pub struct EspPlatform {
    i2c0: Option<I2C0>,
    adc: Option<Arc<AdcUnit>>,
}

impl EspPlatform {
    pub fn new(i2c0: I2C0) -> Self {
        Self {
            i2c0: Some(i2c0),
            adc: None,
        }
    }

    fn adc_unit(&mut self) -> anyhow::Result<Arc<AdcUnit>> {
        if let Some(unit) = &self.adc {
            return Ok(Arc::clone(unit));
        }
        let unit = Arc::new(AdcUnit::new()?);
        self.adc = Some(Arc::clone(&unit));
        Ok(unit)
    }
}

impl Platform for EspPlatform {
    type Bus = I2cDriver<'static>;
    type InterruptPin = EspInputPin;
    type AnalogPin = EspAnalogPin;
    type Accelerometer = EspAccelerometer;
    type Thermometer = Thermistor<EspAnalogPin>;

    fn i2c(&mut self, sda: i32, scl: i32) -> anyhow::Result<Self::Bus> {
        let Some(i2c0) = self.i2c0.take() else {
            bail!("I2C0 already in use");
        };
        let config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
        // SAFETY: the accelerometer pins are claimed exactly once, here.
        let (sda, scl) = unsafe { (AnyIOPin::new(sda), AnyIOPin::new(scl)) };
        Ok(I2cDriver::new(i2c0, sda, scl, &config)?)
    }

    fn interrupt_pin(&mut self, pin: i32) -> anyhow::Result<Self::InterruptPin> {
        // SAFETY: INT1 is claimed exactly once, here.
        Ok(PinDriver::input(unsafe { AnyIOPin::new(pin) })?)
    }

    fn accelerometer(
        &mut self,
        bus: Self::Bus,
        int1: Self::InterruptPin,
    ) -> anyhow::Result<Self::Accelerometer> {
        Lis3dh::new(bus, int1, I2C_ADDR_LIS3DH)
    }

    fn analog_pin(&mut self, pin: i32) -> anyhow::Result<Self::AnalogPin> {
        // ESP32-C3: GPIO0..=4 map straight onto ADC1 channels 0..=4.
        if !(0..=4).contains(&pin) {
            bail!("GPIO{} has no ADC1 channel", pin);
        }
        let unit = self.adc_unit()?;
        let channel = pin as esp_idf_sys::adc_channel_t;

        let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
            atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
            bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let ret = unsafe { esp_idf_sys::adc_oneshot_config_channel(unit.0, channel, &chan_cfg) };
        if ret != esp_idf_sys::ESP_OK {
            bail!("ADC channel {} config failed ({})", channel, ret);
        }

        Ok(EspAnalogPin {
            unit,
            channel,
            last: 0,
        })
    }

    fn thermometer(
        &mut self,
        pin: Self::AnalogPin,
        calibration: ThermistorCalibration,
    ) -> anyhow::Result<Self::Thermometer> {
        Ok(Thermistor::new(pin, calibration))
    }
}
