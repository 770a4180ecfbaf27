use crate::domains::location_cloaking::{CloakingObserver, GridAgent, GridPlane, MaterializedOps};
use std::collections::HashMap;

/// Observer that reports the cloaking view through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl CloakingObserver for LoggingObserver {
    fn on_reconciled_state_change(&self, agents: &HashMap<String, GridAgent>, plane: Option<&GridPlane>) {
        for (alias, agent) in agents {
            tracing::debug!(
                "{}: level {}, position {}, {} vicinity granules",
                alias,
                agent.level,
                agent.position_granule,
                agent.vicinity_top().map_or(0, |v| v.len())
            );
        }
        tracing::info!("{} agents tracked, plane {:?}", agents.len(), plane);
    }

    fn on_connection_status_change(&self, online: bool) {
        if online {
            tracing::info!("location server online");
        } else {
            tracing::warn!("location server offline");
        }
    }

    fn on_geometry_ops(&self, ops: &MaterializedOps) {
        tracing::debug!(
            "geometry ops: grid +{}/-{}, positions +{}/-{}, vicinities +{}/-{}",
            ops.grid_lines.add.len(),
            ops.grid_lines.remove.len(),
            ops.position_tiles.add.len(),
            ops.position_tiles.remove.len(),
            ops.vicinity_tiles.add.len(),
            ops.vicinity_tiles.remove.len()
        );
    }
}
