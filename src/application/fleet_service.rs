use crate::application::supervisor::FrameSink;
use crate::common::{FrameOutcome, Reconciler, ReconciledState};
use crate::domains::fleet::FleetState;
use crate::domains::logger::DynLogger;
use crate::domains::temporal_cloaking::{CloakingOutcome, TemporalCloaking, TemporalCloakingSettings};

/// Tracks the simulator fleet and reruns grid shrinking whenever it moves.
pub struct FleetService {
    reconciler: Reconciler<FleetState>,
    cloaking: TemporalCloaking,
    latest: Option<CloakingOutcome>,
}

impl FleetService {
    pub fn new(logger: DynLogger, settings: TemporalCloakingSettings) -> Self {
        Self {
            reconciler: Reconciler::new(logger),
            cloaking: TemporalCloaking::new(settings),
            latest: None,
        }
    }

    pub fn state(&self) -> &FleetState {
        self.reconciler.state()
    }

    /// Result of the last shrinking run; `None` without an ego vehicle.
    pub fn latest_outcome(&self) -> Option<&CloakingOutcome> {
        self.latest.as_ref()
    }
}

impl FrameSink for FleetService {
    fn on_frame(&mut self, frame: &str) {
        if self.reconciler.handle_frame(frame) != FrameOutcome::Changed {
            return;
        }
        self.latest = self.cloaking.shrink(self.reconciler.state());
        if let Some(outcome) = &self.latest {
            tracing::debug!(
                "{} disclosed after {} steps: {:?}",
                outcome.ego_vehicle,
                outcome.steps.len(),
                outcome.disclosed
            );
        }
    }

    fn on_connection_status(&mut self, online: bool) {
        let msg = if online { "connected" } else { "disconnected" };
        self.reconciler.logger().info(FleetState::COMPONENT, msg);
    }
}
