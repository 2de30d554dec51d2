/// Request encoding and packet decoding
///
/// Stateless translation between wire frames and protocol types. The decoder
/// validates nothing beyond length: symbol and side bytes pass through as
/// received, and all four integers are unsigned big-endian.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::protocol::{CallType, Packet, PACKET_SIZE, SYMBOL_SIZE};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed frame: need {need} bytes, have {have}")]
    MalformedFrame { need: usize, have: usize },

    #[error("sequence {0} does not fit the one-byte resend request (max 255)")]
    SequenceOutOfRange(u32),
}

pub type CodecResult<T> = Result<T, CodecError>;

pub struct WireCodec;

impl WireCodec {
    /// Build the call-type-1 request that asks the server to stream every
    /// packet it has.
    pub fn encode_stream_all() -> [u8; 1] {
        [CallType::StreamAll as u8]
    }

    /// Build the call-type-2 request for a single sequence number.
    ///
    /// The wire form carries the sequence in one byte, so sequences above
    /// 255 are unrepresentable. They are rejected here rather than silently
    /// truncated, which would fetch the wrong packet.
    pub fn encode_resend(sequence: u32) -> CodecResult<[u8; 2]> {
        if sequence > u8::MAX as u32 {
            return Err(CodecError::SequenceOutOfRange(sequence));
        }
        Ok([CallType::Resend as u8, sequence as u8])
    }

    /// Decode one packet from the first 17 bytes of `buffer`.
    pub fn decode_packet(buffer: &[u8]) -> CodecResult<Packet> {
        if buffer.len() < PACKET_SIZE {
            return Err(CodecError::MalformedFrame {
                need: PACKET_SIZE,
                have: buffer.len(),
            });
        }

        let mut symbol = [0u8; SYMBOL_SIZE];
        symbol.copy_from_slice(&buffer[..SYMBOL_SIZE]);

        Ok(Packet {
            symbol,
            side: buffer[4],
            quantity: BigEndian::read_u32(&buffer[5..9]),
            price: BigEndian::read_u32(&buffer[9..13]),
            sequence: BigEndian::read_u32(&buffer[13..17]),
        })
    }
}
