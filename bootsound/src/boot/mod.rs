//! Boot gate: wait for the shell, then play the boot sound once

pub mod orchestrator;
pub mod ready;

pub use orchestrator::{spawn, BootOutcome, BootSound, WavFile, WORKER_THREAD_NAME};
pub use ready::{on_shell_init, ReadinessSignal, ShellReadyFlag};
