use crate::common::{decode_frame, DomainResult, ObserverMessage};
use crate::domains::logger::DynLogger;
use serde::de::DeserializeOwned;

/// Result of applying one well-formed message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    /// Whether the reconciled state differs from before the message.
    pub changed: bool,
    /// Parts of the message that were rejected without affecting the rest
    /// (e.g. one broken user record inside a full sync).
    pub skipped: Vec<String>,
}

impl ApplyOutcome {
    pub fn changed(changed: bool) -> Self {
        Self {
            changed,
            skipped: Vec::new(),
        }
    }
}

/// Per-algorithm client state rebuilt from a stream of sync and delta messages.
pub trait ReconciledState: Send + Default + 'static {
    type Message: ObserverMessage + DeserializeOwned;

    /// Component name used when logging.
    const COMPONENT: &'static str;

    /// Apply one message. Errors must leave the state untouched.
    fn apply(&mut self, message: &Self::Message) -> DomainResult<ApplyOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Changed,
    Unchanged,
    /// Well-formed frame with an unknown discriminator.
    Ignored,
    /// Malformed frame, nothing applied.
    Dropped,
}

/// Owns a `ReconciledState` and feeds it decoded frames strictly in arrival order.
pub struct Reconciler<S: ReconciledState> {
    state: S,
    logger: DynLogger,
    version: u64,
    dropped: u64,
}

impl<S: ReconciledState> Reconciler<S> {
    pub fn new(logger: DynLogger) -> Self {
        Self {
            state: S::default(),
            logger,
            version: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Number of frames that changed the state.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn logger(&self) -> &DynLogger {
        &self.logger
    }

    /// Forget everything, as if freshly constructed.
    pub fn reset(&mut self) {
        self.state = S::default();
        self.version = 0;
        self.dropped = 0;
    }

    pub fn handle_frame(&mut self, frame: &str) -> FrameOutcome {
        match decode_frame::<S::Message>(frame) {
            Ok(message) => self.apply(&message),
            Err(e) => {
                self.dropped += 1;
                self.logger
                    .warn(S::COMPONENT, &format!("Dropping frame: {}", e));
                FrameOutcome::Dropped
            }
        }
    }

    pub fn apply(&mut self, message: &S::Message) -> FrameOutcome {
        if !message.is_recognized() {
            self.logger.warn(
                S::COMPONENT,
                &format!("Ignoring message of unknown type ({})", message.message_type()),
            );
            return FrameOutcome::Ignored;
        }

        match self.state.apply(message) {
            Ok(outcome) => {
                for reason in &outcome.skipped {
                    self.logger.warn(
                        S::COMPONENT,
                        &format!("{}: skipped part of message: {}", message.message_type(), reason),
                    );
                }
                if outcome.changed {
                    self.version += 1;
                    FrameOutcome::Changed
                } else {
                    FrameOutcome::Unchanged
                }
            }
            Err(e) => {
                self.dropped += 1;
                let subject = message.subject().unwrap_or("-");
                self.logger.warn(
                    S::COMPONENT,
                    &format!("Dropping {} for {}: {}", message.message_type(), subject, e),
                );
                FrameOutcome::Dropped
            }
        }
    }
}
