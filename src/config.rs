// Board Input — Hardware & System Configuration
// Target: ESP32-C3 sensor board (LIS3DH, NTC thermistor, photodiode)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_ACCELEROMETER_SDA: i32 = 6; // I2C data line
pub const PIN_ACCELEROMETER_SCL: i32 = 7; // I2C clock line
pub const PIN_ACCELEROMETER_INT: i32 = 5; // LIS3DH INT1
pub const PIN_TEMPERATURE: i32 = 2;       // Thermistor divider (ADC1 channel 2)
pub const PIN_LIGHT: i32 = 3;             // Photodiode (ADC1 channel 3)
pub const PIN_BUTTON_A: i32 = 9;          // BOOT button (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_B: i32 = 10;         // User button (INPUT_PULLUP, active LOW)

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_LIS3DH: u8 = 0x19; // SA0 pulled high
pub const I2C_BAUDRATE_KHZ: u32 = 400;

// ---------------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------------
pub const ADC_MAX_READING: u16 = 4095; // 12-bit one-shot conversions

// ---------------------------------------------------------------------------
// Thermistor (NTC, low side of a divider against the series resistor)
// ---------------------------------------------------------------------------
pub const THERMISTOR_NOMINAL_TEMPERATURE: f32 = 25.0;
pub const THERMISTOR_NOMINAL_RESISTANCE: f32 = 10_000.0;
pub const THERMISTOR_BETA: f32 = 3380.0;
pub const THERMISTOR_SERIES_RESISTANCE: f32 = 10_000.0;
pub const THERMISTOR_ZERO_OFFSET: f32 = 273.5;

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SENSOR: usize = 4096;
pub const STACK_BUTTONS: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SENSOR_SAMPLE_INTERVAL_MS: u64 = 16; // ~62.5 Hz
pub const BUTTON_POLL_INTERVAL_MS: u64 = 10;   // 100 Hz input poll
pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_PRESS_MS: u32 = 1500;
pub const DOUBLE_CLICK_WINDOW_MS: u32 = 400;

/// Pin numbers the hub hands to the platform when it builds its peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignments {
    pub accelerometer_sda: i32,
    pub accelerometer_scl: i32,
    pub accelerometer_int: i32,
    pub temperature: i32,
    pub light: i32,
}

impl Default for PinAssignments {
    fn default() -> Self {
        Self {
            accelerometer_sda: PIN_ACCELEROMETER_SDA,
            accelerometer_scl: PIN_ACCELEROMETER_SCL,
            accelerometer_int: PIN_ACCELEROMETER_INT,
            temperature: PIN_TEMPERATURE,
            light: PIN_LIGHT,
        }
    }
}

/// Beta-model parameters for the on-board NTC thermistor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermistorCalibration {
    /// Temperature (°C) at which the thermistor reads `nominal_resistance`.
    pub nominal_temperature: f32,
    pub nominal_resistance: f32,
    pub beta: f32,
    pub series_resistance: f32,
    /// Celsius → Kelvin offset used by the conversion.
    pub zero_offset: f32,
    pub adc_max: u16,
}

impl Default for ThermistorCalibration {
    fn default() -> Self {
        Self {
            nominal_temperature: THERMISTOR_NOMINAL_TEMPERATURE,
            nominal_resistance: THERMISTOR_NOMINAL_RESISTANCE,
            beta: THERMISTOR_BETA,
            series_resistance: THERMISTOR_SERIES_RESISTANCE,
            zero_offset: THERMISTOR_ZERO_OFFSET,
            adc_max: ADC_MAX_READING,
        }
    }
}
