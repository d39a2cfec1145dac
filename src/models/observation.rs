use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{ProcessingError, Result};

/// Short opaque identifier of the state an observation came from (e.g. `TN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    /// Build a code, rejecting empty text and codes wider than `max_len` characters.
    pub fn new(code: &str, max_len: usize) -> Result<Self> {
        let code = code.trim();

        if code.is_empty() {
            return Err(ProcessingError::malformed("empty state code"));
        }

        let width = code.chars().count();
        if width > max_len {
            return Err(ProcessingError::malformed(format!(
                "state code '{}' is {} characters wide (max {})",
                code, width, max_len
            )));
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StateCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One parsed line of a TDV file. Geolocation is dropped during parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub code: StateCode,
    pub timestamp: DateTime<Utc>,
    pub humidity: f64,
    pub snow: bool,
    pub cloud_cover: f64,
    pub lightning: bool,
    pub pressure: f64,
    /// Surface temperature in Kelvin
    pub temperature: f64,
}

impl Observation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: StateCode,
        timestamp: DateTime<Utc>,
        humidity: f64,
        snow: bool,
        cloud_cover: f64,
        lightning: bool,
        pressure: f64,
        temperature: f64,
    ) -> Self {
        Self {
            code,
            timestamp,
            humidity,
            snow,
            cloud_cover,
            lightning,
            pressure,
            temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code_width() {
        assert_eq!(StateCode::new("TN", 2).unwrap().as_str(), "TN");
        assert_eq!(StateCode::new(" WA ", 2).unwrap().as_str(), "WA");
        assert!(StateCode::new("TEN", 2).is_err());
        assert!(StateCode::new("", 2).is_err());
        assert!(StateCode::new("   ", 2).is_err());
    }

    #[test]
    fn test_state_code_is_opaque() {
        // Not checked against any list of states
        assert_eq!(StateCode::new("ZZ", 2).unwrap().to_string(), "ZZ");
        assert_eq!(StateCode::new("x", 2).unwrap().to_string(), "x");
    }
}
