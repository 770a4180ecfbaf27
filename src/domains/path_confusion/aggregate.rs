use super::events::{AlgorithmSettings, PathConfusionMessage, ReleaseEntry, ReleaseKey};
use crate::common::{ApplyOutcome, DomainResult, ReconciledState};
use chrono::{DateTime, Utc};

/// Client-side view of the path confusion server.
#[derive(Debug, Clone, Default)]
pub struct PathConfusionState {
    pub available_recordings: Vec<String>,
    pub settings: Option<AlgorithmSettings>,
    /// `None` until the server reported whether it is live or replaying.
    pub is_live: Option<bool>,
    /// Ordered by `created_at_time`, arrival order within one interval.
    pub release_entries: Vec<ReleaseEntry>,
    pub available_vehicles: Vec<String>,
    pub relevant_vehicles: Vec<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl PathConfusionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: &ReleaseKey) -> Option<&ReleaseEntry> {
        self.release_entries.iter().find(|e| e.has_key(key))
    }

    pub fn entries_of<'a>(&'a self, vehicle_id: &'a str) -> impl Iterator<Item = &'a ReleaseEntry> + 'a {
        self.release_entries
            .iter()
            .filter(move |e| e.vehicle_id() == vehicle_id)
    }

    pub fn handle_settings_update(&mut self, settings: &AlgorithmSettings, is_live: bool) -> ApplyOutcome {
        let mut changed = false;

        // Switching between live data and a recording starts a new log.
        if self.is_live.is_some_and(|live| live != is_live) && !self.release_entries.is_empty() {
            self.release_entries.clear();
            changed = true;
        }
        if self.is_live != Some(is_live) {
            self.is_live = Some(is_live);
            changed = true;
        }
        if self.settings.as_ref() != Some(settings) {
            self.settings = Some(settings.clone());
            changed = true;
        }
        ApplyOutcome::changed(changed)
    }

    /// Insert new entries and replace ones already known under the same key.
    pub fn handle_release_update(&mut self, entries: &[ReleaseEntry]) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        for entry in entries {
            if entry.vehicle_id().is_empty() || !entry.created_at_time.is_finite() {
                outcome.skipped.push(format!(
                    "release entry with invalid key ({:?}, {})",
                    entry.vehicle_id(),
                    entry.created_at_time
                ));
                continue;
            }

            let key = entry.key();
            match self.release_entries.iter_mut().find(|e| e.has_key(&key)) {
                Some(existing) if existing == entry => {}
                Some(existing) => {
                    *existing = entry.clone();
                    outcome.changed = true;
                }
                None => {
                    let at = self
                        .release_entries
                        .partition_point(|e| e.created_at_time <= entry.created_at_time);
                    self.release_entries.insert(at, entry.clone());
                    outcome.changed = true;
                }
            }
        }
        outcome
    }

    pub fn handle_vehicles(&mut self, available: &[String], relevant: &[String]) -> ApplyOutcome {
        let changed = self.available_vehicles != available || self.relevant_vehicles != relevant;
        self.available_vehicles = available.to_vec();
        self.relevant_vehicles = relevant.to_vec();
        ApplyOutcome::changed(changed)
    }

    pub fn handle_recordings(&mut self, file_names: &[String]) -> ApplyOutcome {
        let changed = self.available_recordings != file_names;
        self.available_recordings = file_names.to_vec();
        ApplyOutcome::changed(changed)
    }
}

impl ReconciledState for PathConfusionState {
    type Message = PathConfusionMessage;

    const COMPONENT: &'static str = "path_confusion";

    fn apply(&mut self, message: &Self::Message) -> DomainResult<ApplyOutcome> {
        let outcome = match message {
            PathConfusionMessage::AvailableRecordings { file_names } => self.handle_recordings(file_names),
            PathConfusionMessage::SettingsUpdate { settings, is_live } => {
                self.handle_settings_update(settings, *is_live)
            }
            PathConfusionMessage::ReleaseUpdate { release_store } => self.handle_release_update(release_store),
            PathConfusionMessage::Vehicles {
                available_vehicles,
                relevant_vehicles,
            } => self.handle_vehicles(available_vehicles, relevant_vehicles),
            PathConfusionMessage::ActionComplete | PathConfusionMessage::Unknown => ApplyOutcome::default(),
        };

        if outcome.changed {
            self.last_update = Some(Utc::now());
        }
        Ok(outcome)
    }
}
