//! Temperature unit conversion.

use crate::types::TemperatureUnit;

/// Round to one decimal place, half away from zero.
///
/// Never returns negative zero.
pub fn round1(value: f64) -> f64 {
    // -0.0 + 0.0 == +0.0
    (value * 10.0).round() / 10.0 + 0.0
}

/// Convert `value` between units, rounded to one decimal place.
///
/// Total over its inputs; identical units return the rounded input.
pub fn convert_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => round1(value * 9.0 / 5.0 + 32.0),
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => round1((value - 32.0) * 5.0 / 9.0),
        (a, b) if a == b => round1(value),
        _ => round1(value),
    }
}
