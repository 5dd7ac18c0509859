//! Shell readiness signal
//!
//! The host's "shell init complete" hook is the only writer. It sets the
//! flag once and never clears it, and the worker only needs to see the
//! store eventually, so relaxed ordering is enough.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Something the boot worker can poll to learn that the shell is up
pub trait ReadinessSignal: Send + Sync {
    fn is_ready(&self) -> bool;
}

impl<F> ReadinessSignal for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_ready(&self) -> bool {
        self()
    }
}

/// One-shot flag shared between the readiness hook and the boot worker
#[derive(Debug, Clone, Default)]
pub struct ShellReadyFlag {
    ready: Arc<AtomicBool>,
}

impl ShellReadyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the shell as ready. Idempotent.
    pub fn signal(&self) {
        self.ready.store(true, Ordering::Relaxed);
    }
}

impl ReadinessSignal for ShellReadyFlag {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

/// Hook body for the host's shell-init event
pub fn on_shell_init(flag: &ShellReadyFlag) {
    flag.signal();
    info!("Shell initialization complete");
}
