pub mod aggregate_store;
pub mod climate_analyzer;

pub use aggregate_store::AggregateStore;
pub use climate_analyzer::{ClimateAnalyzer, IngestReport, UnreadableFile, UnreadableFilePolicy};
