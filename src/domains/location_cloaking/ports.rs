use super::aggregate::GridAgent;
use super::granule::GridPlane;
use super::projections::MaterializedOps;
use std::collections::HashMap;

/// Port for components that render or record the cloaking view.
///
/// Called from the connection task, so implementations must not block.
pub trait CloakingObserver: Send + Sync {
    /// The reconciled agent table changed.
    fn on_reconciled_state_change(&self, agents: &HashMap<String, GridAgent>, plane: Option<&GridPlane>);

    fn on_connection_status_change(&self, online: bool);

    /// Incremental drawing operations derived from the latest change.
    fn on_geometry_ops(&self, _ops: &MaterializedOps) {}
}
