pub mod constants;
pub mod conversions;
pub mod progress;

pub use constants::*;
pub use conversions::{format_ctime, kelvin_to_fahrenheit};
pub use progress::ProgressReporter;
