use chrono::{DateTime, Local, Utc};

use crate::utils::constants::{
    CTIME_FORMAT, KELVIN_TO_FAHRENHEIT_OFFSET, KELVIN_TO_FAHRENHEIT_SCALE,
};

/// Convert an absolute temperature in Kelvin to degrees Fahrenheit
///
/// # Examples
/// ```
/// use climate_summary::utils::kelvin_to_fahrenheit;
///
/// let f = kelvin_to_fahrenheit(273.15);
/// assert!((f - 32.0).abs() < 1e-9);
/// ```
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * KELVIN_TO_FAHRENHEIT_SCALE - KELVIN_TO_FAHRENHEIT_OFFSET
}

/// Render a timestamp in `ctime` layout, in UTC or the local time zone
pub fn format_ctime(timestamp: &DateTime<Utc>, local_time: bool) -> String {
    if local_time {
        timestamp.with_timezone(&Local).format(CTIME_FORMAT).to_string()
    } else {
        timestamp.format(CTIME_FORMAT).to_string()
    }
}
