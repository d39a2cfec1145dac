use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;
use crate::models::StateSummary;
use crate::processors::AggregateStore;
use crate::utils::format_ctime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable per-state blocks
    #[default]
    Text,
    /// JSON array of state summaries
    Json,
    /// One CSV row per state
    Csv,
}

/// Renders the final contents of an [`AggregateStore`].
pub struct ReportWriter {
    format: ReportFormat,
    local_time: bool,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            format: ReportFormat::Text,
            local_time: false,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn summaries(store: &AggregateStore) -> Vec<StateSummary> {
        store.list_states().into_iter().map(StateSummary::from).collect()
    }

    pub fn write_report<W: Write>(&self, store: &AggregateStore, mut out: W) -> Result<()> {
        match self.format {
            ReportFormat::Text => {
                out.write_all(self.render_text(store).as_bytes())?;
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &Self::summaries(store))?;
                writeln!(out)?;
            }
            ReportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut out);
                for summary in Self::summaries(store) {
                    writer.serialize(summary)?;
                }
                writer.flush()?;
            }
        }

        out.flush()?;
        Ok(())
    }

    pub fn render_text(&self, store: &AggregateStore) -> String {
        let mut report = String::new();

        report.push_str("States found:\n");
        let codes: Vec<&str> = store.codes().iter().map(|c| c.as_str()).collect();
        report.push_str(&codes.join(" "));
        report.push('\n');

        for summary in Self::summaries(store) {
            // Writing to a String cannot fail
            let _ = write!(
                report,
                "\n-- State: {} --\n\
                Number of Records: {}\n\
                Average Humidity: {:.1}%\n\
                Average Temperature: {:.1}F\n\
                Max Temperature: {:.1}F\n\
                Max Temperature on: {}\n\
                Min Temperature: {:.1}F\n\
                Min Temperature on: {}\n\
                Lightning Strikes: {}\n\
                Records with Snow Cover: {}\n\
                Average Cloud Cover: {:.1}%\n",
                summary.state,
                summary.records,
                summary.average_humidity,
                summary.average_temperature_f,
                summary.max_temperature_f,
                format_ctime(&summary.max_temperature_at, self.local_time),
                summary.min_temperature_f,
                format_ctime(&summary.min_temperature_at, self.local_time),
                summary.lightning_strikes,
                summary.snow_records,
                summary.average_cloud_cover,
            );
        }

        report
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
