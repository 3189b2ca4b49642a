// Board Input — Gestures & Range Policy
//
// Shock gestures can only fire if the accelerometer can measure the shock, so
// subscribing to one widens the sensing range first. The policy never narrows
// the range.

use crate::drivers::Accelerometer;
use crate::events::*;
use crate::metrics::SensingRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Raised when shaken.
    Shake,
    TiltUp,
    TiltDown,
    /// Raised when the screen is pointing left.
    TiltLeft,
    /// Raised when the screen is pointing right.
    TiltRight,
    FaceUp,
    FaceDown,
    /// Raised when the board is falling.
    FreeFall,
    /// Raised when a 3 g shock is detected.
    ThreeG,
    SixG,
    EightG,
}

/// Range a gesture needs before it can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequirement {
    /// Smallest acceptable range, in g.
    pub minimum_g: u8,
    /// Range configured when the current one is below `minimum_g`.
    pub escalate_to: SensingRange,
}

impl Gesture {
    pub const ALL: [Gesture; 11] = [
        Self::Shake,
        Self::TiltUp,
        Self::TiltDown,
        Self::TiltLeft,
        Self::TiltRight,
        Self::FaceUp,
        Self::FaceDown,
        Self::FreeFall,
        Self::ThreeG,
        Self::SixG,
        Self::EightG,
    ];

    /// Event code raised on the gesture channel.
    pub fn code(self) -> u16 {
        match self {
            Self::Shake => ACCELEROMETER_EVT_SHAKE,
            Self::TiltUp => ACCELEROMETER_EVT_TILT_UP,
            Self::TiltDown => ACCELEROMETER_EVT_TILT_DOWN,
            Self::TiltLeft => ACCELEROMETER_EVT_TILT_LEFT,
            Self::TiltRight => ACCELEROMETER_EVT_TILT_RIGHT,
            Self::FaceUp => ACCELEROMETER_EVT_FACE_UP,
            Self::FaceDown => ACCELEROMETER_EVT_FACE_DOWN,
            Self::FreeFall => ACCELEROMETER_EVT_FREEFALL,
            Self::ThreeG => ACCELEROMETER_EVT_3G,
            Self::SixG => ACCELEROMETER_EVT_6G,
            Self::EightG => ACCELEROMETER_EVT_8G,
        }
    }

    /// Escalation targets sit one standard step above the bare minimum.
    pub fn range_requirement(self) -> Option<RangeRequirement> {
        match self.code() {
            ACCELEROMETER_EVT_3G => Some(RangeRequirement {
                minimum_g: 3,
                escalate_to: SensingRange::FourG,
            }),
            ACCELEROMETER_EVT_6G | ACCELEROMETER_EVT_8G => Some(RangeRequirement {
                minimum_g: 6,
                escalate_to: SensingRange::EightG,
            }),
            _ => None,
        }
    }
}

/// Widen `acc`'s range if `gesture` cannot be detected at the current one.
/// Returns the newly configured range, if any.
pub fn ensure_range<A: Accelerometer + ?Sized>(acc: &mut A, gesture: Gesture) -> Option<SensingRange> {
    let requirement = gesture.range_requirement()?;
    let current = acc.range();
    if current.g() >= requirement.minimum_g {
        return None;
    }

    log::info!(
        "{:?} needs ≥{}g; accelerometer range {} → {}",
        gesture,
        requirement.minimum_g,
        current,
        requirement.escalate_to
    );
    acc.set_range(requirement.escalate_to);
    Some(requirement.escalate_to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimAccelerometer;

    fn at(range: SensingRange) -> SimAccelerometer {
        let acc = SimAccelerometer::default();
        acc.handle().force_range(range);
        acc
    }

    #[test]
    fn codes_are_unique_and_in_range() {
        for (i, a) in Gesture::ALL.iter().enumerate() {
            assert!((1..=11).contains(&a.code()), "{:?}", a);
            for b in &Gesture::ALL[i + 1..] {
                assert_ne!(a.code(), b.code(), "{:?} / {:?}", a, b);
            }
        }
    }

    #[test]
    fn three_g_escalates_to_four_not_three() {
        for start in [SensingRange::OneG, SensingRange::TwoG] {
            let mut acc = at(start);
            assert_eq!(ensure_range(&mut acc, Gesture::ThreeG), Some(SensingRange::FourG));
            assert_eq!(acc.handle().range_writes(), vec![SensingRange::FourG]);
        }
    }

    #[test]
    fn six_and_eight_g_escalate_to_eight() {
        for gesture in [Gesture::SixG, Gesture::EightG] {
            for start in [SensingRange::OneG, SensingRange::TwoG, SensingRange::FourG] {
                let mut acc = at(start);
                assert_eq!(ensure_range(&mut acc, gesture), Some(SensingRange::EightG));
                assert_eq!(acc.range(), SensingRange::EightG);
            }
        }
    }

    #[test]
    fn sufficient_range_is_left_alone() {
        let mut acc = at(SensingRange::FourG);
        assert_eq!(ensure_range(&mut acc, Gesture::ThreeG), None);

        let mut acc = at(SensingRange::EightG);
        for gesture in Gesture::ALL {
            assert_eq!(ensure_range(&mut acc, gesture), None);
        }
        assert!(acc.handle().range_writes().is_empty());
    }

    #[test]
    fn non_shock_gestures_never_touch_range() {
        for gesture in Gesture::ALL {
            if gesture.range_requirement().is_some() {
                continue;
            }
            for start in SensingRange::ALL {
                let mut acc = at(start);
                assert_eq!(ensure_range(&mut acc, gesture), None);
                assert_eq!(acc.range(), start);
            }
        }
    }

    #[test]
    fn only_shock_gestures_have_requirements() {
        let shocks: Vec<Gesture> = Gesture::ALL
            .into_iter()
            .filter(|g| g.range_requirement().is_some())
            .collect();
        assert_eq!(shocks, vec![Gesture::ThreeG, Gesture::SixG, Gesture::EightG]);
    }
}
