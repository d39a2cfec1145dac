use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Observation, StateCode};
use crate::utils::constants::{
    DEFAULT_STATE_CODE_LEN, FIELD_CLOUD_COVER, FIELD_HUMIDITY, FIELD_LIGHTNING, FIELD_PRESSURE,
    FIELD_SNOW, FIELD_STATE_CODE, FIELD_TEMPERATURE, FIELD_TIMESTAMP_MS, MILLIS_PER_SECOND,
    TDV_DELIMITER, TDV_FIELD_COUNT,
};

/// How numeric text that fails to parse is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Substitute `0.0` and keep the line
    #[default]
    Lenient,
    /// Reject the line with [`ProcessingError::NumericParse`]
    Strict,
}

/// An observation plus the number of numeric fields that were zero-substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub observation: Observation,
    pub substitutions: usize,
}

/// Turns one TDV line into an [`Observation`].
///
/// Layout (tab separated): state code, timestamp (ms), geolocation,
/// humidity, snow, cloud cover, lightning, pressure, temperature (K).
#[derive(Debug, Clone)]
pub struct RecordParser {
    numeric_policy: NumericPolicy,
    max_code_len: usize,
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            numeric_policy: NumericPolicy::Lenient,
            max_code_len: DEFAULT_STATE_CODE_LEN,
        }
    }

    pub fn with_numeric_policy(mut self, numeric_policy: NumericPolicy) -> Self {
        self.numeric_policy = numeric_policy;
        self
    }

    pub fn with_max_code_len(mut self, max_code_len: usize) -> Self {
        self.max_code_len = max_code_len;
        self
    }

    /// Parse a single line into an observation
    pub fn parse_line(&self, line: &str) -> Result<Observation> {
        self.parse_record(line).map(|parsed| parsed.observation)
    }

    /// Parse a single line, also reporting how many numeric fields fell back to zero
    pub fn parse_record(&self, line: &str) -> Result<ParsedRecord> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split(TDV_DELIMITER).collect();

        if fields.len() < TDV_FIELD_COUNT {
            return Err(ProcessingError::malformed(format!(
                "expected {} tab-separated fields, found {}",
                TDV_FIELD_COUNT,
                fields.len()
            )));
        }

        let code = StateCode::new(fields[FIELD_STATE_CODE], self.max_code_len)?;

        let mut substitutions = 0;
        let mut numeric = |index: usize, name: &'static str| {
            self.parse_numeric(fields[index], name, &mut substitutions)
        };

        let timestamp_ms = numeric(FIELD_TIMESTAMP_MS, "timestamp")?;
        let humidity = numeric(FIELD_HUMIDITY, "humidity")?;
        let snow = numeric(FIELD_SNOW, "snow")?;
        let cloud_cover = numeric(FIELD_CLOUD_COVER, "cloud cover")?;
        let lightning = numeric(FIELD_LIGHTNING, "lightning")?;
        let pressure = numeric(FIELD_PRESSURE, "pressure")?;
        let temperature = numeric(FIELD_TEMPERATURE, "temperature")?;

        let timestamp = Self::timestamp_from_millis(timestamp_ms)?;

        Ok(ParsedRecord {
            observation: Observation::new(
                code,
                timestamp,
                humidity,
                snow != 0.0,
                cloud_cover,
                lightning != 0.0,
                pressure,
                temperature,
            ),
            substitutions,
        })
    }

    fn parse_numeric(
        &self,
        raw: &str,
        field: &'static str,
        substitutions: &mut usize,
    ) -> Result<f64> {
        let trimmed = raw.trim();

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => match self.numeric_policy {
                NumericPolicy::Lenient => {
                    debug!("Substituting 0 for unparseable {} '{}'", field, trimmed);
                    *substitutions += 1;
                    Ok(0.0)
                }
                NumericPolicy::Strict => Err(ProcessingError::NumericParse {
                    field,
                    value: trimmed.to_string(),
                }),
            },
        }
    }

    /// Milliseconds since the epoch, truncated to whole seconds
    fn timestamp_from_millis(millis: f64) -> Result<DateTime<Utc>> {
        let seconds = (millis / MILLIS_PER_SECOND).trunc();

        if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
            return Err(ProcessingError::malformed(format!(
                "timestamp {} ms is out of range",
                millis
            )));
        }

        DateTime::from_timestamp(seconds as i64, 0).ok_or_else(|| {
            ProcessingError::malformed(format!("timestamp {} ms is out of range", millis))
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "CA\t1428300000000\t9prcjqk3yc80\t93.0\t0.0\t100.0\t0.0\t95644.0\t277.58716\n";

    #[test]
    fn test_parse_sample_line() {
        let parser = RecordParser::new();
        let observation = parser.parse_line(SAMPLE).unwrap();

        assert_eq!(observation.code.as_str(), "CA");
        assert_eq!(observation.timestamp.timestamp(), 1_428_300_000);
        assert_eq!(observation.humidity, 93.0);
        assert!(!observation.snow);
        assert_eq!(observation.cloud_cover, 100.0);
        assert!(!observation.lightning);
        assert_eq!(observation.pressure, 95644.0);
        assert_eq!(observation.temperature, 277.58716);
    }

    #[test]
    fn test_flags_and_crlf() {
        let parser = RecordParser::new();
        let line = "WA\t1000\tgeo\t60\t1.0\t20\t1.0\t1000\t290\r\n";
        let observation = parser.parse_line(line).unwrap();

        assert!(observation.snow);
        assert!(observation.lightning);
        assert_eq!(observation.temperature, 290.0);
        assert_eq!(observation.timestamp.timestamp(), 1);
    }

    #[test]
    fn test_timestamp_truncates_to_seconds() {
        let parser = RecordParser::new();
        let observation = parser
            .parse_line("TN\t1999\tgeo\t0\t0\t0\t0\t0\t0")
            .unwrap();
        assert_eq!(observation.timestamp.timestamp(), 1);
    }

    #[test]
    fn test_too_few_fields_is_malformed() {
        let parser = RecordParser::new();
        let err = parser.parse_line("CA\t0\tgeo\t50\t0").unwrap_err();

        assert!(matches!(err, ProcessingError::MalformedRecord { .. }));
        assert!(err.to_string().contains("found 5"));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let parser = RecordParser::new();
        let observation = parser
            .parse_line("CA\t0\tgeo\t50\t0\t10\t0\t1000\t280\textra")
            .unwrap();
        assert_eq!(observation.temperature, 280.0);
    }

    #[test]
    fn test_wide_state_code_is_malformed() {
        let parser = RecordParser::new();
        assert!(matches!(
            parser.parse_line("CAL\t0\tgeo\t50\t0\t10\t0\t1000\t280"),
            Err(ProcessingError::MalformedRecord { .. })
        ));

        let wide = RecordParser::new().with_max_code_len(3);
        assert!(wide.parse_line("CAL\t0\tgeo\t50\t0\t10\t0\t1000\t280").is_ok());
    }

    #[test]
    fn test_lenient_numeric_substitutes_zero() {
        let parser = RecordParser::new();
        let parsed = parser
            .parse_record("CA\t0\tgeo\thumid\t0\t\t0\t1000\t280")
            .unwrap();

        assert_eq!(parsed.observation.humidity, 0.0);
        assert_eq!(parsed.observation.cloud_cover, 0.0);
        assert_eq!(parsed.substitutions, 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_substitution_logged_at_debug() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            RecordParser::new()
                .parse_record("CA\t0\tgeo\thumid\t0\t10\t0\t1000\t280")
                .unwrap();
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("DEBUG"));
        assert!(output.contains("Substituting 0 for unparseable humidity 'humid'"));
    }

    #[test]
    fn test_strict_numeric_rejects_line() {
        let parser = RecordParser::new().with_numeric_policy(NumericPolicy::Strict);
        let err = parser
            .parse_line("CA\t0\tgeo\thumid\t0\t10\t0\t1000\t280")
            .unwrap_err();

        match err {
            ProcessingError::NumericParse { field, value } => {
                assert_eq!(field, "humidity");
                assert_eq!(value, "humid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_values_are_not_numbers() {
        let parser = RecordParser::new();
        let parsed = parser
            .parse_record("CA\t0\tgeo\tNaN\t0\t10\t0\t1000\tinf")
            .unwrap();

        assert_eq!(parsed.observation.humidity, 0.0);
        assert_eq!(parsed.observation.temperature, 0.0);
        assert_eq!(parsed.substitutions, 2);
    }

    #[test]
    fn test_out_of_range_timestamp_is_malformed() {
        let parser = RecordParser::new();
        assert!(parser
            .parse_line("CA\t1e300\tgeo\t50\t0\t10\t0\t1000\t280")
            .is_err());
    }
}
