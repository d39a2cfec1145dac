use std::collections::HashMap;

use crate::models::{Observation, StateAggregate, StateCode};

/// Per-state running aggregates, keyed by state code.
///
/// Lookup goes through the map; `order` records each code once, the first
/// time it is ingested, so reports list states in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    aggregates: HashMap<StateCode, StateAggregate>,
    order: Vec<StateCode>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation to the aggregate for its state, creating it if needed
    pub fn ingest(&mut self, observation: &Observation) {
        match self.aggregates.get_mut(&observation.code) {
            Some(aggregate) => aggregate.record(observation),
            None => {
                self.order.push(observation.code.clone());
                self.aggregates.insert(
                    observation.code.clone(),
                    StateAggregate::from_observation(observation),
                );
            }
        }
    }

    /// Fold in a store built from later input. New codes keep `later`'s order.
    pub fn absorb(&mut self, later: AggregateStore) {
        let AggregateStore {
            mut aggregates,
            order,
        } = later;

        for code in order {
            let Some(incoming) = aggregates.remove(&code) else {
                continue;
            };

            match self.aggregates.get_mut(&code) {
                Some(existing) => existing.merge(&incoming),
                None => {
                    self.order.push(code.clone());
                    self.aggregates.insert(code, incoming);
                }
            }
        }
    }

    /// All aggregates in the order their codes were first ingested
    pub fn list_states(&self) -> Vec<&StateAggregate> {
        self.order
            .iter()
            .filter_map(|code| self.aggregates.get(code))
            .collect()
    }

    pub fn codes(&self) -> &[StateCode] {
        &self.order
    }

    pub fn get(&self, code: &str) -> Option<&StateAggregate> {
        self.aggregates.get(code)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total_records(&self) -> u64 {
        self.aggregates.values().map(|a| a.record_count()).sum()
    }
}

impl<'a> Extend<&'a Observation> for AggregateStore {
    fn extend<T: IntoIterator<Item = &'a Observation>>(&mut self, observations: T) {
        for observation in observations {
            self.ingest(observation);
        }
    }
}
