//! Testing utilities and mock implementations
//!
//! Mock collaborators for exercising the runtime without a broker, a socket
//! or a real clock.

pub mod mocks;

pub use mocks::*;
