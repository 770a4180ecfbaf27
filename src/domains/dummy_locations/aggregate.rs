use super::events::{Dummy, LogItem, UserMovement, VisualizationInfo};
use crate::common::ApplyOutcome;
use chrono::{DateTime, Utc};

/// Latest dumps fetched from the dummy-locations services. Every dump
/// replaces the previous one of its kind.
#[derive(Debug, Clone, Default)]
pub struct DummyLocationsState {
    pub location_server_logs: Vec<LogItem>,
    pub user_movements: Vec<UserMovement>,
    pub dummies: Vec<Dummy>,
    pub last_update: Option<DateTime<Utc>>,
}

impl DummyLocationsState {
    pub const COMPONENT: &'static str = "dummy_locations";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_visualization_info(&mut self, info: VisualizationInfo) -> ApplyOutcome {
        let changed = self.location_server_logs != info.logs;
        self.location_server_logs = info.logs;
        self.touch(changed)
    }

    pub fn handle_user_movements(&mut self, movements: Vec<UserMovement>) -> ApplyOutcome {
        let changed = self.user_movements != movements;
        self.user_movements = movements;
        self.touch(changed)
    }

    pub fn handle_dummies(&mut self, dummies: Vec<Dummy>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        for dummy in &dummies {
            if dummy.current().is_none() && !dummy.nodes.is_empty() {
                outcome.skipped.push(format!(
                    "dummy {} points at node {} of {}",
                    dummy.dummy_no,
                    dummy.current_node,
                    dummy.nodes.len()
                ));
            }
        }
        outcome.changed = self.dummies != dummies;
        self.dummies = dummies;
        if outcome.changed {
            self.last_update = Some(Utc::now());
        }
        outcome
    }

    /// Forget the location server logs, mirroring a log reset on the server.
    pub fn clear_logs(&mut self) -> ApplyOutcome {
        let changed = !self.location_server_logs.is_empty();
        self.location_server_logs.clear();
        self.touch(changed)
    }

    fn touch(&mut self, changed: bool) -> ApplyOutcome {
        if changed {
            self.last_update = Some(Utc::now());
        }
        ApplyOutcome::changed(changed)
    }
}
