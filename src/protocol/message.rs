//! Application message model
//!
//! A [`Message`] carries one application payload plus its destination and
//! delivery attributes. Fields are private and every mutation goes through a
//! validating setter, so an invalid value never lands in a message.
//!
//! # Examples
//! ```
//! use mqtt_runtime::protocol::{Message, QoS};
//!
//! let mut message = Message::new("21.5")
//!     .with_destination_name("sensors/kitchen/temperature")
//!     .unwrap()
//!     .with_qos(QoS::AtLeastOnce);
//! message.set_retained(true);
//!
//! assert_eq!(message.topic(), Some("sensors/kitchen/temperature"));
//! assert_eq!(&message.payload_bytes()[..], b"21.5");
//! assert!(message.set_qos(3).is_err());
//! assert_eq!(message.qos(), QoS::AtLeastOnce);
//! ```

use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Message body in the representation it was supplied in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Bytes),
}

impl Payload {
    /// Length of the encoded payload in bytes
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<[u8; N]> for Payload {
    fn from(bytes: [u8; N]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(&bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

/// Payloads from dynamically typed input: a JSON string becomes text, an
/// array of integers in `0..=255` becomes bytes, anything else is rejected.
impl TryFrom<&Value> for Payload {
    type Error = ClientError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Payload::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Payload::from)
                .ok_or_else(|| ClientError::invalid_argument(value, "payload")),
            other => Err(ClientError::invalid_argument(other, "payload")),
        }
    }
}

/// Delivery guarantee requested for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum QoS {
    /// Best effort
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<i64> for QoS {
    type Error = ClientError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(ClientError::invalid_qos(other)),
        }
    }
}

impl TryFrom<u8> for QoS {
    type Error = ClientError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        QoS::try_from(i64::from(value))
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> Self {
        qos as u8
    }
}

/// An application message, sent or received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    payload: Payload,
    destination_name: Option<String>,
    qos: QoS,
    retained: bool,
    duplicate: bool,
}

impl Message {
    /// Create a message with default delivery attributes and no destination
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            destination_name: None,
            qos: QoS::default(),
            retained: false,
            duplicate: false,
        }
    }

    /// Create a message from a dynamically typed payload
    pub fn try_new(payload: &Value) -> ClientResult<Self> {
        Payload::try_from(payload).map(Self::new)
    }

    /// Build a message from a JSON object
    ///
    /// Recognised keys: `payload` (required), `destinationName` or `topic`,
    /// `qos`, `retained`, `duplicate`. Each present field goes through the
    /// same validation as its setter.
    pub fn from_json(value: &Value) -> ClientResult<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| ClientError::invalid_argument(value, "message"))?;

        let payload = fields
            .get("payload")
            .ok_or_else(|| ClientError::invalid_argument(value, "payload"))?;
        let mut message = Self::try_new(payload)?;

        for key in ["destinationName", "topic"] {
            if let Some(name) = fields.get(key) {
                let name = name
                    .as_str()
                    .ok_or_else(|| ClientError::invalid_argument(name, "destinationName"))?;
                message.set_destination_name(name)?;
            }
        }

        if let Some(qos) = fields.get("qos") {
            let raw = qos.as_i64().ok_or_else(|| ClientError::invalid_qos(qos))?;
            message.set_qos(raw)?;
        }

        if let Some(retained) = fields.get("retained") {
            let retained = retained
                .as_bool()
                .ok_or_else(|| ClientError::invalid_argument(retained, "retained"))?;
            message.set_retained(retained);
        }

        if let Some(duplicate) = fields.get("duplicate") {
            let duplicate = duplicate
                .as_bool()
                .ok_or_else(|| ClientError::invalid_argument(duplicate, "duplicate"))?;
            message.set_duplicate(duplicate);
        }

        Ok(message)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Payload as text, decoding stored bytes on every call
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn payload_string(&self) -> Cow<'_, str> {
        match &self.payload {
            Payload::Text(text) => Cow::Borrowed(text.as_str()),
            Payload::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// Payload as text, failing if stored bytes are not valid UTF-8
    pub fn try_payload_string(&self) -> ClientResult<Cow<'_, str>> {
        match &self.payload {
            Payload::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            Payload::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(ClientError::malformed_utf),
        }
    }

    /// Payload as bytes
    ///
    /// Text payloads are encoded into a fresh buffer on every call. Byte
    /// payloads return a handle to the original immutable buffer.
    pub fn payload_bytes(&self) -> Bytes {
        match &self.payload {
            Payload::Text(text) => Bytes::from(text.clone().into_bytes()),
            Payload::Bytes(bytes) => bytes.clone(),
        }
    }

    pub fn destination_name(&self) -> Option<&str> {
        self.destination_name.as_deref()
    }

    /// Set the destination, rejecting an empty name
    ///
    /// Stricter than the loosely typed MQTT clients this model follows,
    /// which accept any string here: an empty topic can never be published
    /// or matched, so it fails with [`ClientError::InvalidArgument`].
    pub fn set_destination_name(&mut self, name: impl Into<String>) -> ClientResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ClientError::invalid_argument("\"\"", "destinationName"));
        }
        self.destination_name = Some(name);
        Ok(())
    }

    /// Alias of [`Message::destination_name`]
    pub fn topic(&self) -> Option<&str> {
        self.destination_name()
    }

    /// Alias of [`Message::set_destination_name`]
    pub fn set_topic(&mut self, topic: impl Into<String>) -> ClientResult<()> {
        self.set_destination_name(topic)
    }

    pub fn qos(&self) -> QoS {
        self.qos
    }

    /// Set the delivery guarantee from its wire value (0, 1 or 2)
    pub fn set_qos(&mut self, qos: i64) -> ClientResult<()> {
        self.qos = QoS::try_from(qos)?;
        Ok(())
    }

    pub fn retained(&self) -> bool {
        self.retained
    }

    pub fn set_retained(&mut self, retained: bool) {
        self.retained = retained;
    }

    pub fn duplicate(&self) -> bool {
        self.duplicate
    }

    /// Mark the message as a possible redelivery; set by the receive path
    pub fn set_duplicate(&mut self, duplicate: bool) {
        self.duplicate = duplicate;
    }

    pub fn with_destination_name(mut self, name: impl Into<String>) -> ClientResult<Self> {
        self.set_destination_name(name)?;
        Ok(self)
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_retained(mut self, retained: bool) -> Self {
        self.retained = retained;
        self
    }

    /// Check the message can be handed to the transport, returning its destination
    pub fn validate_for_send(&self) -> ClientResult<&str> {
        self.destination_name()
            .ok_or_else(|| ClientError::invalid_state("destinationName not set"))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(destination={}, qos={}, retained={}, duplicate={}, payload_len={})",
            self.destination_name().unwrap_or("<unset>"),
            u8::from(self.qos),
            self.retained,
            self.duplicate,
            self.payload.len()
        )
    }
}
