use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::StateAggregate;
use crate::utils::conversions::kelvin_to_fahrenheit;

/// Report-ready view of a [`StateAggregate`], temperatures in Fahrenheit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: String,
    pub records: u64,
    pub average_humidity: f64,
    pub average_temperature_f: f64,
    pub max_temperature_f: f64,
    pub max_temperature_at: DateTime<Utc>,
    pub min_temperature_f: f64,
    pub min_temperature_at: DateTime<Utc>,
    pub lightning_strikes: u64,
    pub snow_records: u64,
    pub average_cloud_cover: f64,
}

impl From<&StateAggregate> for StateSummary {
    fn from(aggregate: &StateAggregate) -> Self {
        let (max_k, max_at) = aggregate.max_temperature();
        let (min_k, min_at) = aggregate.min_temperature();

        Self {
            state: aggregate.code().to_string(),
            records: aggregate.record_count(),
            average_humidity: aggregate.average_humidity(),
            average_temperature_f: kelvin_to_fahrenheit(aggregate.average_temperature()),
            max_temperature_f: kelvin_to_fahrenheit(max_k),
            max_temperature_at: max_at,
            min_temperature_f: kelvin_to_fahrenheit(min_k),
            min_temperature_at: min_at,
            lightning_strikes: aggregate.lightning_strikes(),
            snow_records: aggregate.snow_records(),
            average_cloud_cover: aggregate.average_cloud_cover(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Observation, StateCode};

    #[test]
    fn test_summary_converts_to_fahrenheit() {
        let observation = Observation::new(
            StateCode::new("TN", 2).unwrap(),
            DateTime::from_timestamp(1_438_599_600, 0).unwrap(),
            40.0,
            true,
            80.0,
            false,
            100_000.0,
            300.0,
        );
        let summary = StateSummary::from(&StateAggregate::from_observation(&observation));

        assert_eq!(summary.state, "TN");
        assert_eq!(summary.records, 1);
        assert!((summary.average_temperature_f - 80.33).abs() < 1e-9);
        assert_eq!(summary.max_temperature_f, summary.min_temperature_f);
        assert_eq!(summary.snow_records, 1);
        assert_eq!(summary.lightning_strikes, 0);
    }
}
