//! Control packet encoding needed by the runtime
//!
//! Only header-only packets are produced here; everything with a variable
//! header or payload belongs to the full protocol codec.

use crate::error::{ClientError, ClientResult};
use bytes::{BufMut, Bytes, BytesMut};

/// Control packet types, numbered as on the wire (upper nibble of byte 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PubRec = 5,
    PubRel = 6,
    PubComp = 7,
    Subscribe = 8,
    SubAck = 9,
    Unsubscribe = 10,
    UnsubAck = 11,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
}

impl PacketType {
    /// Whether the packet consists of the fixed header alone
    pub fn is_header_only(self) -> bool {
        matches!(
            self,
            PacketType::PingReq | PacketType::PingResp | PacketType::Disconnect
        )
    }
}

impl TryFrom<u8> for PacketType {
    type Error = ClientError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let packet_type = match value {
            1 => PacketType::Connect,
            2 => PacketType::ConnAck,
            3 => PacketType::Publish,
            4 => PacketType::PubAck,
            5 => PacketType::PubRec,
            6 => PacketType::PubRel,
            7 => PacketType::PubComp,
            8 => PacketType::Subscribe,
            9 => PacketType::SubAck,
            10 => PacketType::Unsubscribe,
            11 => PacketType::UnsubAck,
            12 => PacketType::PingReq,
            13 => PacketType::PingResp,
            14 => PacketType::Disconnect,
            other => return Err(ClientError::invalid_argument(other, "packetType")),
        };
        Ok(packet_type)
    }
}

/// Encode a packet that has no variable header and no payload
pub fn encode_header_only(packet_type: PacketType) -> ClientResult<Bytes> {
    if !packet_type.is_header_only() {
        return Err(ClientError::invalid_argument(
            format!("{packet_type:?}"),
            "packetType",
        ));
    }

    let mut buffer = BytesMut::with_capacity(2);
    buffer.put_u8((packet_type as u8) << 4);
    // remaining length
    buffer.put_u8(0);
    Ok(buffer.freeze())
}

const PINGREQ_PACKET: [u8; 2] = [(PacketType::PingReq as u8) << 4, 0x00];

/// Produces the heartbeat probe sent by the liveness monitor
pub trait ProtocolEncoder: Send + Sync {
    fn encode_heartbeat_probe(&self) -> Bytes;
}

/// Encoder for the standard MQTT wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct WireEncoder;

impl ProtocolEncoder for WireEncoder {
    fn encode_heartbeat_probe(&self) -> Bytes {
        Bytes::from_static(&PINGREQ_PACKET)
    }
}
