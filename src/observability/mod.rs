//! Observability for the client runtime
//!
//! Structured logging setup and the span macro used by the liveness monitor.

pub mod logging;

pub use logging::{init_default_logging, init_from_config, init_logging, parse_level, LogFormat};

pub use logging::liveness_span;
