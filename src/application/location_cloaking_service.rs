use crate::application::supervisor::FrameSink;
use crate::common::{FrameOutcome, Reconciler, ReconciledState};
use crate::domains::location_cloaking::{
    CloakingObserver, GridMaterializer, LocationCloakingState, MaterializedOps, TileColors,
};
use crate::domains::logger::DynLogger;
use std::sync::Arc;

/// Reconciled location cloaking view plus everything derived from it.
///
/// Used as the supervisor's sink: every frame is reconciled, the drawing
/// operations it causes are derived and both are pushed to the observers.
pub struct LocationCloakingService {
    reconciler: Reconciler<LocationCloakingState>,
    materializer: GridMaterializer,
    colors: TileColors,
    observers: Vec<Arc<dyn CloakingObserver>>,
    online: bool,
}

impl LocationCloakingService {
    pub fn new(logger: DynLogger, colors: TileColors) -> Self {
        Self {
            reconciler: Reconciler::new(logger.clone()),
            materializer: GridMaterializer::new(logger),
            colors,
            observers: Vec::new(),
            online: false,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CloakingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn state(&self) -> &LocationCloakingState {
        self.reconciler.state()
    }

    pub fn reconciler(&self) -> &Reconciler<LocationCloakingState> {
        &self.reconciler
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn colors(&self) -> &TileColors {
        &self.colors
    }

    /// Swap the tile colors and return the redraw they cause.
    pub fn set_colors(&mut self, colors: TileColors) -> MaterializedOps {
        self.colors = colors;
        let ops = self.geometry_ops();
        self.publish_ops(&ops);
        ops
    }

    /// Operations that bring the rendered view up to date. Empty when
    /// nothing changed since the previous call.
    pub fn geometry_ops(&mut self) -> MaterializedOps {
        self.materializer
            .materialize(self.reconciler.state(), &self.colors)
    }

    fn publish_ops(&self, ops: &MaterializedOps) {
        if ops.is_empty() {
            return;
        }
        for observer in &self.observers {
            observer.on_geometry_ops(ops);
        }
    }
}

impl FrameSink for LocationCloakingService {
    fn on_frame(&mut self, frame: &str) {
        if self.reconciler.handle_frame(frame) != FrameOutcome::Changed {
            return;
        }

        let state = self.reconciler.state();
        for observer in &self.observers {
            observer.on_reconciled_state_change(&state.agents, state.plane.as_ref());
        }
        let ops = self.geometry_ops();
        self.publish_ops(&ops);
    }

    fn on_connection_status(&mut self, online: bool) {
        self.online = online;
        self.reconciler.logger().info(
            LocationCloakingState::COMPONENT,
            if online { "connected" } else { "disconnected" },
        );
        for observer in &self.observers {
            observer.on_connection_status_change(online);
        }
    }
}
