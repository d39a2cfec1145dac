use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Observation, StateCode};

/// Running statistics for every observation seen so far for one state code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAggregate {
    code: StateCode,
    record_count: u64,
    sum_temperature: f64,
    sum_humidity: f64,
    sum_cloud_cover: f64,
    lightning_strikes: u64,
    snow_records: u64,
    max_temperature: f64,
    max_temperature_at: DateTime<Utc>,
    min_temperature: f64,
    min_temperature_at: DateTime<Utc>,
}

impl StateAggregate {
    /// Seed an aggregate from the first observation for a code.
    pub fn from_observation(observation: &Observation) -> Self {
        Self {
            code: observation.code.clone(),
            record_count: 1,
            sum_temperature: observation.temperature,
            sum_humidity: observation.humidity,
            sum_cloud_cover: observation.cloud_cover,
            lightning_strikes: u64::from(observation.lightning),
            snow_records: u64::from(observation.snow),
            max_temperature: observation.temperature,
            max_temperature_at: observation.timestamp,
            min_temperature: observation.temperature,
            min_temperature_at: observation.timestamp,
        }
    }

    /// Fold one more observation into the running totals.
    ///
    /// Extremes only move on a strictly greater/smaller temperature, so the
    /// first observation to reach a value keeps its timestamp.
    pub fn record(&mut self, observation: &Observation) {
        debug_assert_eq!(self.code, observation.code);

        self.record_count += 1;
        self.sum_temperature += observation.temperature;
        self.sum_humidity += observation.humidity;
        self.sum_cloud_cover += observation.cloud_cover;
        self.lightning_strikes += u64::from(observation.lightning);
        self.snow_records += u64::from(observation.snow);

        if observation.temperature > self.max_temperature {
            self.max_temperature = observation.temperature;
            self.max_temperature_at = observation.timestamp;
        }

        if observation.temperature < self.min_temperature {
            self.min_temperature = observation.temperature;
            self.min_temperature_at = observation.timestamp;
        }
    }

    /// Fold an aggregate built from a later batch of input into this one.
    ///
    /// `self` is treated as the earlier batch: on equal extremes its
    /// timestamps are kept.
    pub fn merge(&mut self, later: &StateAggregate) {
        debug_assert_eq!(self.code, later.code);

        self.record_count += later.record_count;
        self.sum_temperature += later.sum_temperature;
        self.sum_humidity += later.sum_humidity;
        self.sum_cloud_cover += later.sum_cloud_cover;
        self.lightning_strikes += later.lightning_strikes;
        self.snow_records += later.snow_records;

        if later.max_temperature > self.max_temperature {
            self.max_temperature = later.max_temperature;
            self.max_temperature_at = later.max_temperature_at;
        }

        if later.min_temperature < self.min_temperature {
            self.min_temperature = later.min_temperature;
            self.min_temperature_at = later.min_temperature_at;
        }
    }

    pub fn code(&self) -> &StateCode {
        &self.code
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn sum_temperature(&self) -> f64 {
        self.sum_temperature
    }

    pub fn sum_humidity(&self) -> f64 {
        self.sum_humidity
    }

    pub fn sum_cloud_cover(&self) -> f64 {
        self.sum_cloud_cover
    }

    pub fn lightning_strikes(&self) -> u64 {
        self.lightning_strikes
    }

    pub fn snow_records(&self) -> u64 {
        self.snow_records
    }

    /// Highest temperature (Kelvin) and when it was first observed
    pub fn max_temperature(&self) -> (f64, DateTime<Utc>) {
        (self.max_temperature, self.max_temperature_at)
    }

    /// Lowest temperature (Kelvin) and when it was first observed
    pub fn min_temperature(&self) -> (f64, DateTime<Utc>) {
        (self.min_temperature, self.min_temperature_at)
    }

    pub fn average_temperature(&self) -> f64 {
        self.sum_temperature / self.record_count as f64
    }

    pub fn average_humidity(&self) -> f64 {
        self.sum_humidity / self.record_count as f64
    }

    pub fn average_cloud_cover(&self) -> f64 {
        self.sum_cloud_cover / self.record_count as f64
    }
}
