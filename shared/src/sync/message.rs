use naia_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};
use thiserror::Error;

use crate::{sync::payload_writer::PayloadWriter, TierName};

/// Bumped whenever the layout of [`SyncMessage`] changes
pub const PROTOCOL_VERSION: u8 = 1;

/// Limits enforced at registration and again while decoding untrusted
/// payloads, so every registered order fits in one sync message
pub const MAX_TIER_COUNT: usize = 4096;
pub const MAX_NAME_BYTES: usize = 256;

/// Errors that can occur while decoding a sync message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Payload is truncated or otherwise not a sync message
    #[error("Malformed tier sync payload of {payload_size} bytes")]
    Malformed { payload_size: usize },

    /// Sender speaks another protocol version
    #[error("Tier sync protocol version mismatch: expected {expected}, received {received}")]
    VersionMismatch { expected: u8, received: u8 },
}

/// Messages exchanged during the tier sync handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    /// Host -> peer: the full sorted order, lesser tiers first
    Order(Vec<TierName>),
    /// Peer -> host: the order was installed
    Ack,
}

impl SyncMessage {
    pub fn to_payload(&self) -> Box<[u8]> {
        let mut writer =
            PayloadWriter::with_bit_capacity(PROTOCOL_VERSION.bit_length() + self.bit_length());
        PROTOCOL_VERSION.ser(&mut writer);
        self.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, WireError> {
        let malformed = |_| WireError::Malformed {
            payload_size: payload.len(),
        };
        let mut reader = BitReader::new(payload);
        let version = u8::de(&mut reader).map_err(malformed)?;
        if version != PROTOCOL_VERSION {
            return Err(WireError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                received: version,
            });
        }
        Self::de(&mut reader).map_err(malformed)
    }
}

impl Serde for SyncMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            SyncMessage::Order(names) => {
                false.ser(writer);
                UnsignedVariableInteger::<7>::new(names.len() as u64).ser(writer);
                for name in names {
                    name.ser(writer);
                }
            }
            SyncMessage::Ack => {
                true.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            return Ok(SyncMessage::Ack);
        }
        let count = read_length(reader, MAX_TIER_COUNT)?;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(TierName::de(reader)?);
        }
        Ok(SyncMessage::Order(names))
    }

    fn bit_length(&self) -> u32 {
        match self {
            SyncMessage::Order(names) => {
                let mut output = false.bit_length();
                output += UnsignedVariableInteger::<7>::new(names.len() as u64).bit_length();
                for name in names {
                    output += name.bit_length();
                }
                output
            }
            SyncMessage::Ack => true.bit_length(),
        }
    }
}

impl Serde for TierName {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let text = self.to_string();
        UnsignedVariableInteger::<7>::new(text.len() as u64).ser(writer);
        for byte in text.bytes() {
            byte.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader, MAX_NAME_BYTES)?;
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(u8::de(reader)?);
        }
        let text = String::from_utf8(bytes).map_err(|_| SerdeErr)?;
        TierName::parse(&text).map_err(|_| SerdeErr)
    }

    fn bit_length(&self) -> u32 {
        let length = self.to_string().len();
        UnsignedVariableInteger::<7>::new(length as u64).bit_length() + (length as u32) * 8
    }
}

fn read_length(reader: &mut BitReader, max: usize) -> Result<usize, SerdeErr> {
    let length = UnsignedVariableInteger::<7>::de(reader)?.get();
    match usize::try_from(length) {
        Ok(length) if length <= max => Ok(length),
        _ => Err(SerdeErr),
    }
}
