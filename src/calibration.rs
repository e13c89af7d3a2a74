//! Calibration equations and pages from GoIO DDS sensor memory.
//!
//! Smart sensors store a calibration record in onboard DDS memory: an
//! equation tag, up to three calibration pages of coefficients, and a units
//! string per page. The driver applies the equation itself
//! (`CalibrateData`); this module only models the descriptors and the
//! reporting conventions built on top of them.

use std::fmt;

/// Equation tag stored in a sensor's DDS record.
///
/// Only `Linear` carries page coefficients the reporting layer uses; the
/// nonlinear forms are applied entirely inside the vendor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationEquation {
    /// No calibration; readings are raw voltages.
    None,
    /// `reading = a + b * volts`
    Linear,
    /// `reading = a + b * volts + c * volts^2`
    Quadratic,
    /// Power law.
    Power,
    /// Modified power law.
    ModifiedPower,
    /// Logarithmic.
    Logarithmic,
    /// Modified logarithmic.
    ModifiedLogarithmic,
    /// Exponential.
    Exponential,
    /// Modified exponential.
    ModifiedExponential,
    /// Geometric.
    Geometric,
    /// Modified geometric.
    ModifiedGeometric,
    /// Reciprocal log.
    ReciprocalLog,
    /// Steinhart-Hart thermistor equation.
    SteinhartHart,
    /// Motion detector distance transform.
    Motion,
    /// Rotary motion transform.
    Rotary,
    /// Heat pulser transform.
    HeatPulser,
    /// Drop counter transform.
    DropCounter,
    /// Tag not known to this crate; treated as nonlinear when reporting.
    Other(i8),
}

impl CalibrationEquation {
    /// Maps the raw DDS tag byte onto an equation variant.
    pub fn from_raw(tag: i8) -> Self {
        match tag {
            0 => CalibrationEquation::None,
            1 => CalibrationEquation::Linear,
            2 => CalibrationEquation::Quadratic,
            3 => CalibrationEquation::Power,
            4 => CalibrationEquation::ModifiedPower,
            5 => CalibrationEquation::Logarithmic,
            6 => CalibrationEquation::ModifiedLogarithmic,
            7 => CalibrationEquation::Exponential,
            8 => CalibrationEquation::ModifiedExponential,
            9 => CalibrationEquation::Geometric,
            10 => CalibrationEquation::ModifiedGeometric,
            11 => CalibrationEquation::ReciprocalLog,
            12 => CalibrationEquation::SteinhartHart,
            13 => CalibrationEquation::Motion,
            14 => CalibrationEquation::Rotary,
            15 => CalibrationEquation::HeatPulser,
            16 => CalibrationEquation::DropCounter,
            other => CalibrationEquation::Other(other),
        }
    }

    /// The raw DDS tag byte for this variant.
    pub fn raw(self) -> i8 {
        match self {
            CalibrationEquation::None => 0,
            CalibrationEquation::Linear => 1,
            CalibrationEquation::Quadratic => 2,
            CalibrationEquation::Power => 3,
            CalibrationEquation::ModifiedPower => 4,
            CalibrationEquation::Logarithmic => 5,
            CalibrationEquation::ModifiedLogarithmic => 6,
            CalibrationEquation::Exponential => 7,
            CalibrationEquation::ModifiedExponential => 8,
            CalibrationEquation::Geometric => 9,
            CalibrationEquation::ModifiedGeometric => 10,
            CalibrationEquation::ReciprocalLog => 11,
            CalibrationEquation::SteinhartHart => 12,
            CalibrationEquation::Motion => 13,
            CalibrationEquation::Rotary => 14,
            CalibrationEquation::HeatPulser => 15,
            CalibrationEquation::DropCounter => 16,
            CalibrationEquation::Other(tag) => tag,
        }
    }

    /// Whether the reporting layer should fetch page coefficients and units.
    pub fn is_linear(self) -> bool {
        self == CalibrationEquation::Linear
    }
}

/// One calibration page from a sensor's DDS record: three coefficients and
/// the units label readings are reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPage {
    /// Coefficient a (offset for the linear form).
    pub a: f32,
    /// Coefficient b (gain for the linear form).
    pub b: f32,
    /// Coefficient c (unused by the linear form).
    pub c: f32,
    /// Units string, e.g. `"Deg C"` or `"Volts"`.
    pub units: String,
}

/// Averages one run of calibrated samples the way the GoIO demo reports it.
///
/// With two or more samples this is the arithmetic mean. With one sample or
/// none, the accumulator is reported unadjusted: a single sample comes back
/// as-is, and an empty run comes back as 0.0 rather than dividing by zero.
/// The count <= 1 branch is historical behavior carried over from the
/// vendor's demo flow and is pinned by tests; an empty run therefore prints
/// a 0.0 "average" that is not a real reading.
pub fn reported_average(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    if values.len() > 1 {
        sum / values.len() as f64
    } else {
        sum
    }
}

/// Formats an averaged reading for the console report.
///
/// Linear calibrations print three decimals with the page's units suffix.
/// Every other equation prints the bare value with a generic "volts" label,
/// without touching the calibration page.
pub fn format_reading(
    average: f64,
    equation: CalibrationEquation,
    page: Option<&CalibrationPage>,
) -> String {
    match page {
        Some(page) if equation.is_linear() => format!("{:.3} {}", average, page.units),
        _ => format!("{average} volts"),
    }
}

impl fmt::Display for CalibrationPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a={} b={} c={} units={}",
            self.a, self.b, self.c, self.units
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equation_round_trip() {
        for tag in 0..=16 {
            assert_eq!(CalibrationEquation::from_raw(tag).raw(), tag);
        }
        assert_eq!(
            CalibrationEquation::from_raw(42),
            CalibrationEquation::Other(42)
        );
    }

    #[test]
    fn test_only_linear_reports_units() {
        assert!(CalibrationEquation::Linear.is_linear());
        assert!(!CalibrationEquation::SteinhartHart.is_linear());
        assert!(!CalibrationEquation::Other(99).is_linear());
    }

    #[test]
    fn test_average_of_many_is_arithmetic_mean() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((reported_average(&values) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_average_of_one_is_the_sample_itself() {
        assert!((reported_average(&[2.748]) - 2.748).abs() < 1e-12);
    }

    #[test]
    fn test_average_of_none_is_zero_not_a_division() {
        // Pins the historical count <= 1 behavior: no division, plain 0.0.
        assert_eq!(reported_average(&[]), 0.0);
    }

    #[test]
    fn test_linear_reading_formats_three_decimals_with_units() {
        let page = CalibrationPage {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            units: "Volts".into(),
        };
        let line = format_reading(2.74825, CalibrationEquation::Linear, Some(&page));
        assert_eq!(line, "2.748 Volts");
    }

    #[test]
    fn test_nonlinear_reading_uses_generic_volts_label() {
        let line = format_reading(1.5, CalibrationEquation::SteinhartHart, None);
        assert_eq!(line, "1.5 volts");
    }

    #[test]
    fn test_linear_without_page_falls_back_to_volts_label() {
        let line = format_reading(0.0, CalibrationEquation::Linear, None);
        assert_eq!(line, "0 volts");
    }
}
