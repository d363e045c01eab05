//! Message model and wire helpers for the MQTT client runtime
//!
//! [`message`] holds the application message value type; [`wire`] holds the
//! control packet table and the heartbeat probe encoder.

pub mod message;
pub mod wire;

pub use message::{Message, Payload, QoS};
pub use wire::{encode_header_only, PacketType, ProtocolEncoder, WireEncoder};
