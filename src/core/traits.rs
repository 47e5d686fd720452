//! Capability traits consumed by the training core
//!
//! The trainers never own these collaborators; they only poll them. Both
//! traits are deliberately tiny so callers can hand in whatever fits:
//! a ctrl-c flag, a test stub, or the process logger.

use log::Level;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation signal, polled at iteration boundaries of the
/// SMO loop and of the cross-validation/grid-search loops. A `true` answer
/// aborts training with [`crate::core::SvmError::TrainingInterrupted`].
pub trait TrainingInterruption {
    fn should_interrupt(&self) -> bool;
}

/// Interruption source that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterrupt;

impl TrainingInterruption for NeverInterrupt {
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Interruption source backed by a shared flag, e.g. set from a signal
/// handler or another thread.
#[derive(Debug, Default)]
pub struct FlagInterruption {
    flag: AtomicBool,
}

impl FlagInterruption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl TrainingInterruption for FlagInterruption {
    fn should_interrupt(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Leveled gate for optional diagnostic output. The core queries the gate
/// before formatting diagnostic text so that disabled levels cost nothing.
pub trait Diagnostics {
    fn allows_info(&self) -> bool;
    fn allows_debug(&self) -> bool;
    fn allows_trace(&self) -> bool;
}

/// Diagnostics gate wired to the process logger: a level is allowed
/// whenever the `log` facade would emit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn allows_info(&self) -> bool {
        log::log_enabled!(Level::Info)
    }

    fn allows_debug(&self) -> bool {
        log::log_enabled!(Level::Debug)
    }

    fn allows_trace(&self) -> bool {
        log::log_enabled!(Level::Trace)
    }
}

/// Diagnostics gate that suppresses everything. Handy in tests and tight
/// benchmark loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietDiagnostics;

impl Diagnostics for QuietDiagnostics {
    fn allows_info(&self) -> bool {
        false
    }

    fn allows_debug(&self) -> bool {
        false
    }

    fn allows_trace(&self) -> bool {
        false
    }
}
