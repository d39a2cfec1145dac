/// TDV record layout
pub const TDV_DELIMITER: char = '\t';
pub const TDV_FIELD_COUNT: usize = 9;

/// Field positions within a TDV record
pub const FIELD_STATE_CODE: usize = 0;
pub const FIELD_TIMESTAMP_MS: usize = 1;
pub const FIELD_HUMIDITY: usize = 3;
pub const FIELD_SNOW: usize = 4;
pub const FIELD_CLOUD_COVER: usize = 5;
pub const FIELD_LIGHTNING: usize = 6;
pub const FIELD_PRESSURE: usize = 7;
pub const FIELD_TEMPERATURE: usize = 8;

/// State codes are two-letter postal abbreviations
pub const DEFAULT_STATE_CODE_LEN: usize = 2;

/// Timestamps arrive in milliseconds since the Unix epoch
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Kelvin to Fahrenheit: F = K * 1.8 - 459.67
pub const KELVIN_TO_FAHRENHEIT_SCALE: f64 = 1.8;
pub const KELVIN_TO_FAHRENHEIT_OFFSET: f64 = 459.67;

/// `ctime(3)` layout, e.g. `Mon Aug  3 11:00:00 2015`
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 10;
pub const PROGRESS_UPDATE_INTERVAL: u64 = 1024;

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "CLIMATE";
