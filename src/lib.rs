// Library interface for trang-gate
// This allows integration tests and external code to use the gate directly

pub mod artifact;
pub mod cli_utils;
pub mod config;
pub mod config_discovery;
pub mod gate;
pub mod logging;
pub mod translator;

// Re-export commonly used types
pub use artifact::{ArtifactRef, BuildRequest};
pub use config::GateConfig;
pub use gate::{GateError, GateOutcome, StaleReason, Staleness, StalenessGate};
pub use translator::{
    CommandTranslator, FnTranslator, InvocationError, InvocationErrorKind, Translator,
};
