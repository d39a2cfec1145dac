pub mod observation;
pub mod state_aggregate;
pub mod summary;

pub use observation::{Observation, StateCode};
pub use state_aggregate::StateAggregate;
pub use summary::StateSummary;
