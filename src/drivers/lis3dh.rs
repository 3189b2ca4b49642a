// Board Input — LIS3DH Accelerometer Driver
//
// Register-level driver over any embedded-hal I2C bus. Runs the chip at
// 100 Hz in high-resolution (12-bit) mode and caches the latest sample in
// milli-g. INT1 is claimed with the chip but its interrupt is left
// unconfigured; nothing recognises gestures on the device yet.

use anyhow::anyhow;
use embedded_hal::i2c::I2c;

use crate::drivers::Accelerometer;
use crate::metrics::SensingRange;

// LIS3DH register addresses
const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL_REG1: u8 = 0x20;
const REG_CTRL_REG4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28; // Start of 6-byte sample burst
const AUTO_INCREMENT: u8 = 0x80;
const WHO_AM_I_EXPECTED: u8 = 0x33;

const CTRL1_100HZ_XYZ: u8 = 0x57; // ODR 100 Hz, normal power, X/Y/Z enabled
const CTRL4_BDU_HR: u8 = 0x88; // block data update, high resolution

/// Full-scale bits (CTRL_REG4[5:4]) and sensitivity (mg/digit) in HR mode.
fn full_scale(range: SensingRange) -> Option<(u8, i32)> {
    match range {
        SensingRange::OneG => None,
        SensingRange::TwoG => Some((0b00, 1)),
        SensingRange::FourG => Some((0b01, 2)),
        SensingRange::EightG => Some((0b10, 4)),
    }
}

pub struct Lis3dh<I2C, INT> {
    i2c: I2C,
    // Held so no other driver can claim the line.
    _int1: INT,
    address: u8,
    range: SensingRange,
    sample: [i32; 3],
}

impl<I2C: I2c, INT> Lis3dh<I2C, INT> {
    /// Probe the chip and start sampling at ±2 g.
    pub fn new(i2c: I2C, int1: INT, address: u8) -> anyhow::Result<Self> {
        let mut acc = Self {
            i2c,
            _int1: int1,
            address,
            range: SensingRange::TwoG,
            sample: [0; 3],
        };

        let who_am_i = acc.read_register(REG_WHO_AM_I)?;
        if who_am_i != WHO_AM_I_EXPECTED {
            return Err(anyhow!(
                "LIS3DH not found at 0x{:02X} (WHO_AM_I = 0x{:02X})",
                address,
                who_am_i
            ));
        }

        acc.write_register(REG_CTRL_REG1, CTRL1_100HZ_XYZ)?;
        acc.write_full_scale(SensingRange::TwoG)?;

        log::info!("LIS3DH initialised (±2g, 100Hz, high resolution)");
        Ok(acc)
    }

    fn read_register(&mut self, reg: u8) -> anyhow::Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| anyhow!("LIS3DH read of 0x{:02X} failed: {:?}", reg, e))?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> anyhow::Result<()> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| anyhow!("LIS3DH write of 0x{:02X} failed: {:?}", reg, e))
    }

    fn write_full_scale(&mut self, range: SensingRange) -> anyhow::Result<()> {
        let (fs, _) = full_scale(range).ok_or_else(|| anyhow!("LIS3DH has no {} range", range))?;
        self.write_register(REG_CTRL_REG4, CTRL4_BDU_HR | (fs << 4))?;
        self.range = range;
        Ok(())
    }

    fn sample_f32(&self) -> [f32; 3] {
        self.sample.map(|v| v as f32)
    }
}

impl<I2C: I2c, INT> Accelerometer for Lis3dh<I2C, INT> {
    /// Burst-read all 3 axes and convert to milli-g.
    fn update(&mut self) -> anyhow::Result<()> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(self.address, &[REG_OUT_X_L | AUTO_INCREMENT], &mut raw)
            .map_err(|e| anyhow!("LIS3DH sample read failed: {:?}", e))?;

        let sensitivity = full_scale(self.range).map_or(1, |(_, s)| s);
        for (axis, bytes) in raw.chunks_exact(2).enumerate() {
            // Left-justified 12-bit two's complement.
            let counts = i16::from_le_bytes([bytes[0], bytes[1]]) >> 4;
            self.sample[axis] = i32::from(counts) * sensitivity;
        }
        Ok(())
    }

    fn x(&self) -> i32 {
        self.sample[0]
    }

    fn y(&self) -> i32 {
        self.sample[1]
    }

    fn z(&self) -> i32 {
        self.sample[2]
    }

    fn instantaneous_acceleration_squared(&self) -> u64 {
        // |axis| ≤ 8188 mg, so the sum fits comfortably.
        self.sample.iter().map(|v| u64::from(v.unsigned_abs()).pow(2)).sum()
    }

    fn pitch(&self) -> i32 {
        let [x, y, z] = self.sample_f32();
        let roll = x.atan2(-z);
        y.atan2(x * roll.sin() - z * roll.cos()).to_degrees().round() as i32
    }

    fn roll(&self) -> i32 {
        let [x, _, z] = self.sample_f32();
        x.atan2(-z).to_degrees().round() as i32
    }

    fn range(&self) -> SensingRange {
        self.range
    }

    fn set_range(&mut self, range: SensingRange) {
        if full_scale(range).is_none() {
            log::warn!("LIS3DH cannot measure {}; staying at {}", range, self.range);
            return;
        }
        if let Err(e) = self.write_full_scale(range) {
            log::warn!("LIS3DH range change to {} failed: {}", range, e);
        }
    }
}
