//! Layered run configuration.
//!
//! Settings are resolved from built-in defaults, then an optional config
//! file, then `CLIMATE_*` environment variables. Command-line flags are
//! applied on top by the CLI layer.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::processors::UnreadableFilePolicy;
use crate::readers::NumericPolicy;
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_REPORTED_ERRORS, DEFAULT_STATE_CODE_LEN,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// What to do with numeric text that does not parse
    pub numeric_policy: NumericPolicy,

    /// Whether an input file that cannot be opened ends the run
    pub unreadable_file_policy: UnreadableFilePolicy,

    /// Widest state code accepted before a line counts as malformed
    #[validate(range(min = 1, max = 8))]
    pub max_code_len: usize,

    /// Read input through a memory map instead of a buffered reader
    pub use_mmap: bool,

    #[validate(range(min = 1024))]
    pub buffer_size: usize,

    /// Render report timestamps in the local time zone instead of UTC
    pub local_time: bool,

    /// Malformed lines listed per file in the validation summary
    pub max_reported_errors: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            numeric_policy: NumericPolicy::Lenient,
            unreadable_file_policy: UnreadableFilePolicy::Abort,
            max_code_len: DEFAULT_STATE_CODE_LEN,
            use_mmap: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            local_time: false,
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus `CLIMATE_*` environment variables
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("Resolved configuration: {:?}", settings);

        Ok(settings)
    }
}
