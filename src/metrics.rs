// Board Input — Metrics
//
// Derived readings: acceleration projections, tilt angles and the
// accelerometer sensing range.

use std::fmt;

use crate::drivers::Accelerometer;

/// Which scalar of the acceleration vector to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    X,
    Y,
    Z,
    /// Euclidean norm of the vector.
    Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationAxis {
    Pitch,
    Roll,
}

/// Maximum measurable acceleration, in multiples of gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SensingRange {
    OneG = 1,
    TwoG = 2,
    FourG = 4,
    EightG = 8,
}

impl SensingRange {
    pub const ALL: [SensingRange; 4] = [Self::OneG, Self::TwoG, Self::FourG, Self::EightG];

    pub fn g(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SensingRange {
    type Error = anyhow::Error;

    fn try_from(g: u8) -> anyhow::Result<Self> {
        match g {
            1 => Ok(Self::OneG),
            2 => Ok(Self::TwoG),
            4 => Ok(Self::FourG),
            8 => Ok(Self::EightG),
            other => Err(anyhow::anyhow!("unsupported sensing range: {}g", other)),
        }
    }
}

impl fmt::Display for SensingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g", self.g())
    }
}

/// Acceleration along `dimension` in milli-g.
pub fn acceleration<A: Accelerometer + ?Sized>(acc: &A, dimension: Dimension) -> i32 {
    match dimension {
        Dimension::X => acc.x(),
        Dimension::Y => acc.y(),
        Dimension::Z => acc.z(),
        Dimension::Strength => {
            let norm = acc.instantaneous_acceleration_squared().isqrt();
            i32::try_from(norm).unwrap_or(i32::MAX)
        }
    }
}

/// Tilt angle in degrees, always within [-180, 180].
pub fn rotation<A: Accelerometer + ?Sized>(acc: &A, axis: RotationAxis) -> i32 {
    let degrees = match axis {
        RotationAxis::Pitch => acc.pitch(),
        RotationAxis::Roll => acc.roll(),
    };
    degrees.clamp(-180, 180)
}
