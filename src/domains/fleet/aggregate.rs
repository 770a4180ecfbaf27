use super::events::{FleetSnapshot, FleetVehicle};
use crate::common::{ApplyOutcome, DomainResult, ReconciledState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Vehicles currently driving in the simulator.
#[derive(Debug, Clone, Default)]
pub struct FleetState {
    pub agents: BTreeMap<String, FleetVehicle>,
    pub last_update: Option<DateTime<Utc>>,
}

impl FleetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(&self, id: &str) -> Option<&FleetVehicle> {
        self.agents.get(id)
    }

    pub fn active_ids(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    /// Replace the fleet with the snapshot; vehicles missing from it left.
    pub fn handle_snapshot(&mut self, snapshot: &FleetSnapshot) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        let mut next = BTreeMap::new();

        for vehicle in &snapshot.data {
            if vehicle.id.is_empty() {
                outcome.skipped.push("vehicle without id".to_string());
                continue;
            }
            if next.insert(vehicle.id.clone(), vehicle.clone()).is_some() {
                outcome.skipped.push(format!("{}: listed twice, keeping the last", vehicle.id));
            }
        }

        outcome.changed = next != self.agents;
        self.agents = next;
        outcome
    }
}

impl ReconciledState for FleetState {
    type Message = FleetSnapshot;

    const COMPONENT: &'static str = "fleet";

    fn apply(&mut self, message: &Self::Message) -> DomainResult<ApplyOutcome> {
        let outcome = self.handle_snapshot(message);
        if outcome.changed {
            self.last_update = Some(Utc::now());
        }
        Ok(outcome)
    }
}
