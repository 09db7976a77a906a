use snafu::Snafu;
use tracing::{debug, error};

/// Lifecycle of the process-wide archive writer.
pub enum WriterPhase<W> {
    Uninitialized,
    Ready(W),
    Failed { reason: String },
}

impl<W> WriterPhase<W> {
    pub fn name(&self) -> &'static str {
        match self {
            WriterPhase::Uninitialized => "uninitialized",
            WriterPhase::Ready(_) => "ready",
            WriterPhase::Failed { .. } => "failed",
        }
    }
}

/// Holds the archive writer capability together with its readiness.
///
/// The slot starts out uninitialized; [`WriterSlot::initialize`] moves it to
/// ready or failed. A failed slot may be initialized again, a ready one is kept.
pub struct WriterSlot<W> {
    phase: WriterPhase<W>,
}

impl<W> Default for WriterSlot<W> {
    fn default() -> Self {
        Self {
            phase: WriterPhase::Uninitialized,
        }
    }
}

impl<W> WriterSlot<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize<E: std::error::Error>(
        &mut self,
        init: impl FnOnce() -> Result<W, E>,
    ) -> &WriterPhase<W> {
        if matches!(self.phase, WriterPhase::Ready(_)) {
            debug!("Archive writer already initialized");
            return &self.phase;
        }

        self.phase = match init() {
            Ok(writer) => WriterPhase::Ready(writer),
            Err(e) => {
                error!("Archive writer failed to initialize: {}", e);
                WriterPhase::Failed {
                    reason: e.to_string(),
                }
            }
        };
        debug!("Archive writer is {}", self.phase.name());
        &self.phase
    }

    pub fn ready(&self) -> Result<&W, WriterNotReady> {
        match &self.phase {
            WriterPhase::Ready(writer) => Ok(writer),
            WriterPhase::Uninitialized => Err(WriterNotReady::Uninitialized),
            WriterPhase::Failed { reason } => Err(WriterNotReady::Failed {
                reason: reason.clone(),
            }),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum WriterNotReady {
    #[snafu(display("Archive writer has not been initialized"))]
    Uninitialized,
    #[snafu(display("Archive writer failed to initialize: {}", reason))]
    Failed { reason: String },
}
