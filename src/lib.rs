//! MQTT client runtime
//!
//! Client-side building blocks for an MQTT-style publish/subscribe client.
//!
//! # Overview
//!
//! - [`protocol::Message`]: validated application message with text and
//!   byte views of its payload
//! - [`transport::LivenessMonitor`]: keep-alive monitor that probes a quiet
//!   connection and reports it dead after a missed probe cycle
//! - [`error`]: error catalog with stable numeric codes
//! - [`config`] and [`observability`]: TOML configuration and structured logging
//!
//! # Quick Start
//!
//! ```rust
//! use mqtt_runtime::protocol::{Message, QoS, WireEncoder};
//! use mqtt_runtime::testing::{MockController, MockTimerService};
//! use mqtt_runtime::transport::{LivenessMonitor, MonitorState};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let message = Message::new("hello")
//!     .with_destination_name("greetings")
//!     .unwrap()
//!     .with_qos(QoS::AtLeastOnce);
//! assert_eq!(message.payload_string(), "hello");
//!
//! let timers = Arc::new(MockTimerService::new());
//! let controller = Arc::new(MockController::new());
//! let monitor = LivenessMonitor::new(30, &WireEncoder, timers.clone(), &controller);
//!
//! // every outbound packet resets the monitor
//! monitor.reset();
//! timers.advance(Duration::from_secs(30));
//! assert_eq!(monitor.state(), MonitorState::AwaitingProbe);
//!
//! timers.advance(Duration::from_secs(30));
//! assert_eq!(controller.fatal_reports().len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod testing;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use protocol::{Message, Payload, QoS};
pub use transport::{ConnectionController, LivenessMonitor, TimerService, TokioTimerService};
