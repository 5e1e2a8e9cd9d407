pub mod metrics;
pub mod tracing;

pub use metrics::{Metrics, PushKind, PushOutcome};
pub use tracing::{TracingConfig, TracingError, TracingGuard, init_tracing};
