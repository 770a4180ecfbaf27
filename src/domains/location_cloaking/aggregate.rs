use super::events::{primary_alias, IncrementalUpdate, LocationServerMessage, PlaneData, SyncUser};
use super::granule::{GranuleId, GridPlane, MAX_GRANULE_LEVEL};
use crate::common::{ApplyOutcome, DomainError, DomainResult, ReconciledState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A set of granules on one level of an agent's vicinity stack.
pub type GranuleSet = BTreeSet<GranuleId>;

/// Reconstructed cloaking state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAgent {
    pub level: u32,
    pub position_granule: GranuleId,
    /// One set per level, index 0 is the shallowest. The last entry is the
    /// live vicinity.
    pub vicinity_granules: Vec<GranuleSet>,
    /// Only used for the illustrative vicinity circle.
    pub vicinity_radius: f64,
}

/// Levels deeper than any granule id can address are rejected before they
/// size anything.
fn check_level(level: u32) -> DomainResult<()> {
    if level > MAX_GRANULE_LEVEL {
        return Err(DomainError::malformed(format!(
            "level {} exceeds the deepest granule level {}",
            level, MAX_GRANULE_LEVEL
        )));
    }
    Ok(())
}

impl GridAgent {
    pub fn vicinity_top(&self) -> Option<&GranuleSet> {
        self.vicinity_granules.last()
    }

    fn from_sync(user: &SyncUser) -> DomainResult<Self> {
        check_level(user.level)?;
        let deepest = user
            .granularities
            .last()
            .ok_or_else(|| DomainError::malformed("user record without granularities"))?;

        Ok(Self {
            level: user.level,
            position_granule: deepest.encrypted_location.granule,
            vicinity_granules: user
                .granularities
                .iter()
                .map(|g| g.encrypted_vicinity.granules.iter().copied().collect())
                .collect(),
            vicinity_radius: user.vicinity_shape.radius,
        })
    }
}

/// Client-side view of the spatial granule cloaking algorithm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCloakingState {
    pub plane: Option<GridPlane>,
    /// Bumped on every plane-init; drawn grid geometry from an older epoch is stale.
    pub plane_epoch: u64,
    pub agents: HashMap<String, GridAgent>,
    pub last_update: Option<DateTime<Utc>>,
}

impl LocationCloakingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self, alias: &str) -> Option<&GridAgent> {
        self.agents.get(alias)
    }

    pub fn max_level(&self) -> u32 {
        self.agents.values().map(|a| a.level).max().unwrap_or(0)
    }

    pub fn handle_plane_init(&mut self, plane_data: &PlaneData) -> DomainResult<ApplyOutcome> {
        let plane = GridPlane::from(plane_data);
        if !(plane.lon_min < plane.lon_max && plane.lat_min < plane.lat_max) {
            return Err(DomainError::malformed(format!(
                "degenerate grid plane {:?}",
                plane
            )));
        }

        self.plane = Some(plane);
        self.plane_epoch += 1;
        Ok(ApplyOutcome::changed(true))
    }

    /// Overwrite every alias present in the sync. Aliases not mentioned keep
    /// their state.
    pub fn handle_full_sync(&mut self, users: &[SyncUser]) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        for user in users {
            let Some(alias) = primary_alias(&user.alias) else {
                outcome.skipped.push("user record without alias".to_string());
                continue;
            };
            let agent = match GridAgent::from_sync(user) {
                Ok(agent) => agent,
                Err(e) => {
                    outcome.skipped.push(format!("{}: {}", alias, e));
                    continue;
                }
            };

            if self.agents.get(alias) != Some(&agent) {
                self.agents.insert(alias.to_string(), agent);
                outcome.changed = true;
            }
        }

        outcome
    }

    pub fn handle_incremental_update(
        &mut self,
        update: &IncrementalUpdate,
    ) -> DomainResult<ApplyOutcome> {
        let alias = primary_alias(&update.alias)
            .ok_or_else(|| DomainError::malformed("incremental update without alias"))?;
        check_level(update.level)?;
        let mut outcome = ApplyOutcome::default();

        let level = update.level as usize;
        let mut stack: Vec<GranuleSet> = self
            .agents
            .get(alias)
            .map(|a| a.vicinity_granules.iter().take(level + 1).cloned().collect())
            .unwrap_or_default();

        if level > stack.len() {
            outcome.skipped.push(format!(
                "{}: level {} skips levels {}..{}, padding with empty sets",
                alias,
                level,
                stack.len(),
                level
            ));
            stack.resize_with(level, GranuleSet::new);
        }

        let inserts = update.vicinity_insert.granules.iter().copied();
        if level == stack.len() {
            // Brand new deepest level, nothing to delete from.
            stack.push(inserts.collect());
        } else {
            let existing = &mut stack[level];
            for id in &update.vicinity_delete.granules {
                existing.remove(id);
            }
            existing.extend(inserts);
        }

        let agent = GridAgent {
            level: update.level,
            position_granule: update.new_location.granule,
            vicinity_granules: stack,
            vicinity_radius: update.vicinity_shape.radius,
        };

        if self.agents.get(alias) != Some(&agent) {
            self.agents.insert(alias.to_string(), agent);
            outcome.changed = true;
        }
        Ok(outcome)
    }
}

impl ReconciledState for LocationCloakingState {
    type Message = LocationServerMessage;

    const COMPONENT: &'static str = "location_cloaking";

    fn apply(&mut self, message: &Self::Message) -> DomainResult<ApplyOutcome> {
        let outcome = match message {
            LocationServerMessage::InitComplete { plane_data } => {
                self.handle_plane_init(plane_data)?
            }
            LocationServerMessage::Sync { users } => self.handle_full_sync(users),
            LocationServerMessage::IncrementalUpdate(update) => {
                self.handle_incremental_update(update)?
            }
            LocationServerMessage::Unknown => ApplyOutcome::default(),
        };

        if outcome.changed {
            self.last_update = Some(Utc::now());
        }
        Ok(outcome)
    }
}
