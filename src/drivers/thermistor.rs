// Board Input — NTC Thermistor
//
// The thermistor sits on the low side of a divider with the series resistor
// to the ADC reference. Temperature comes from the beta equation.

use crate::config::ThermistorCalibration;
use crate::drivers::{AnalogInput, Thermometer};

pub struct Thermistor<P> {
    pin: P,
    calibration: ThermistorCalibration,
}

impl<P: AnalogInput> Thermistor<P> {
    pub fn new(pin: P, calibration: ThermistorCalibration) -> Self {
        Self { pin, calibration }
    }

    /// Convert a raw ADC reading to degrees Celsius.
    pub fn celsius(&self, reading: u16) -> f32 {
        let cal = &self.calibration;
        let max = f32::from(cal.adc_max);
        // Rails give 0 Ω / open circuit; pin to the last representable step.
        let reading = f32::from(reading.clamp(1, cal.adc_max.saturating_sub(1).max(1)));

        let resistance = cal.series_resistance / (max / reading - 1.0);
        let inv_kelvin = (resistance / cal.nominal_resistance).ln() / cal.beta
            + 1.0 / (cal.nominal_temperature + cal.zero_offset);
        1.0 / inv_kelvin - cal.zero_offset
    }
}

impl<P: AnalogInput> Thermometer for Thermistor<P> {
    fn temperature(&mut self) -> i32 {
        let reading = self.pin.analog_value();
        self.celsius(reading).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u16);

    impl AnalogInput for Fixed {
        fn analog_value(&mut self) -> u16 {
            self.0
        }
    }

    fn thermistor(reading: u16) -> Thermistor<Fixed> {
        Thermistor::new(Fixed(reading), ThermistorCalibration::default())
    }

    #[test]
    fn midpoint_is_nominal_temperature() {
        // Equal divider halves → thermistor at its nominal resistance.
        assert_eq!(thermistor(2048).temperature(), 25);
    }

    #[test]
    fn warmer_thermistor_reads_lower_voltage() {
        let cold = thermistor(3000).temperature();
        let hot = thermistor(1200).temperature();
        assert!(cold < 25, "cold = {}", cold);
        assert!(hot > 25, "hot = {}", hot);
    }

    #[test]
    fn rail_readings_stay_finite() {
        let t = thermistor(0);
        assert!(t.celsius(0).is_finite());
        assert!(t.celsius(4095).is_finite());
    }
}
