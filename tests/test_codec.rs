/// Wire-format conformance tests

use byteorder::{BigEndian, ByteOrder};
use feed_client::{CodecError, WireCodec, PACKET_SIZE};

fn create_frame(symbol: &[u8; 4], side: u8, quantity: u32, price: u32, sequence: u32) -> Vec<u8> {
    let mut frame = vec![0u8; PACKET_SIZE];
    frame[..4].copy_from_slice(symbol);
    frame[4] = side;
    BigEndian::write_u32(&mut frame[5..9], quantity);
    BigEndian::write_u32(&mut frame[9..13], price);
    BigEndian::write_u32(&mut frame[13..17], sequence);
    frame
}

#[test]
fn test_decode_known_frame() {
    let frame = create_frame(b"NSEI", b'B', 125, 9_870, 71);
    let pkt = WireCodec::decode_packet(&frame).unwrap();

    assert_eq!(&pkt.symbol, b"NSEI");
    assert_eq!(pkt.side, b'B');
    assert_eq!(pkt.quantity, 125);
    assert_eq!(pkt.price, 9_870);
    assert_eq!(pkt.sequence, 71);
}

#[test]
fn test_decode_is_big_endian() {
    // quantity bytes 00 00 01 00 must read as 256, not 65536.
    let mut frame = create_frame(b"ABCD", b'S', 0, 0, 0);
    frame[5..9].copy_from_slice(&[0x00, 0x00, 0x01, 0x00]);
    frame[13..17].copy_from_slice(&[0x01, 0x00, 0x00, 0x00]);

    let pkt = WireCodec::decode_packet(&frame).unwrap();
    assert_eq!(pkt.quantity, 256);
    assert_eq!(pkt.sequence, 1 << 24);
}

#[test]
fn test_decode_high_bit_sequence_is_unsigned() {
    let frame = create_frame(b"ABCD", b'B', 0, 0, 0x8000_0001);
    let pkt = WireCodec::decode_packet(&frame).unwrap();
    assert_eq!(pkt.sequence, 0x8000_0001);
}

#[test]
fn test_decode_every_short_length_fails() {
    let frame = create_frame(b"ABCD", b'B', 1, 1, 1);
    for len in 0..PACKET_SIZE {
        let result = WireCodec::decode_packet(&frame[..len]);
        assert!(
            matches!(result, Err(CodecError::MalformedFrame { need: 17, have }) if have == len),
            "length {} should be malformed",
            len
        );
    }
}

#[test]
fn test_decode_passes_odd_bytes_through() {
    // Neither symbol content nor the side byte is validated.
    let frame = create_frame(&[0xFF, 0x00, b'!', 0x7F], 0xC3, 1, 1, 5);
    let pkt = WireCodec::decode_packet(&frame).unwrap();
    assert_eq!(pkt.symbol, [0xFF, 0x00, b'!', 0x7F]);
    assert_eq!(pkt.side, 0xC3);
}

#[test]
fn test_encode_stream_all_frame() {
    assert_eq!(WireCodec::encode_stream_all(), [1u8]);
}

#[test]
fn test_encode_resend_frame() {
    assert_eq!(WireCodec::encode_resend(44).unwrap(), [2u8, 44]);
    assert_eq!(WireCodec::encode_resend(255).unwrap(), [2u8, 255]);
}

#[test]
fn test_encode_resend_rejects_truncation() {
    // 300 would alias to 44 on the wire; the codec refuses instead.
    assert_eq!(
        WireCodec::encode_resend(300),
        Err(CodecError::SequenceOutOfRange(300))
    );
    assert_eq!(
        WireCodec::encode_resend(256),
        Err(CodecError::SequenceOutOfRange(256))
    );
    assert_eq!(
        WireCodec::encode_resend(u32::MAX),
        Err(CodecError::SequenceOutOfRange(u32::MAX))
    );
}
