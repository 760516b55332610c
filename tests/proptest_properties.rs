use bytes::{Bytes, BytesMut};
use deltapack::diff::{Block, BlockCodec, ExhaustiveMatcher, apply_blocks, calculate_blocks};
use deltapack::protocol::{PacketHeader, Source, Target, varint};
use deltapack::{Compressor, Decompressor};
use proptest::prelude::*;

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 1..=128).prop_map(|data| Block::Literal(Bytes::from(data))),
        (any::<u32>(), 1usize..=128).prop_map(|(offset, length)| Block::Match {
            offset: offset as usize,
            length,
        }),
    ]
}

fn header_strategy() -> impl Strategy<Value = PacketHeader> {
    let from = prop_oneof![Just(Source::Literal), (0usize..14).prop_map(Source::Slot)];
    let to = prop_oneof![Just(Target::Skip), (0usize..14).prop_map(Target::Slot)];
    (from, to).prop_map(|(from, to)| PacketHeader::new(from, to))
}

/// Packets drawn from a small alphabet so later packets share content
fn related_packets() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(
        proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'{'), any::<u8>()], 0..256),
        1..6,
    )
}

proptest! {
    #[test]
    fn prop_varint_roundtrip(value in any::<u64>()) {
        let mut buf = BytesMut::new();
        let written = varint::write(value, &mut buf);

        prop_assert_eq!(written, varint::encoded_len(value));
        prop_assert_eq!(varint::read(&buf).unwrap(), (value, written));
    }

    #[test]
    fn prop_block_roundtrip(block in block_strategy()) {
        let mut buf = BytesMut::new();
        let written = BlockCodec::write_block(&block, &mut buf).unwrap();
        prop_assert_eq!(written, block.encoded_len());

        let (decoded, consumed) = BlockCodec::read_block(&buf.freeze()).unwrap();
        prop_assert_eq!(consumed, written);
        prop_assert_eq!(decoded, block);
    }

    #[test]
    fn prop_header_roundtrip(header in header_strategy()) {
        let byte = header.to_byte().unwrap();
        prop_assert_eq!(PacketHeader::from_byte(byte).unwrap(), header);
    }

    #[test]
    fn prop_patch_rebuilds_modified(
        base in proptest::collection::vec(any::<u8>(), 0..512),
        modified in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let modified = Bytes::from(modified);
        let blocks = calculate_blocks(&base, &modified, &ExhaustiveMatcher::new());
        prop_assert_eq!(apply_blocks(&base, &blocks).unwrap(), modified);
    }

    #[test]
    fn prop_session_roundtrip(packets in related_packets()) {
        let mut compressor = Compressor::new();
        let mut decompressor = Decompressor::new();

        for packet in &packets {
            let frame = compressor.compress(packet).unwrap();
            prop_assert!(frame.len() <= packet.len() + 1, "frame={} packet={}", frame.len(), packet.len());
            let decoded = decompressor.decompress(frame).unwrap();
            prop_assert_eq!(decoded.as_ref(), packet.as_slice());
        }
    }

    #[test]
    fn prop_decompress_never_panics(frame in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut decompressor = Decompressor::new();
        let _ = decompressor.decompress(frame);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_fresh_session_large_packets(packet in proptest::collection::vec(any::<u8>(), 0..=64 * 1024)) {
        let mut compressor = Compressor::new();
        let mut decompressor = Decompressor::new();

        let frame = compressor.compress(&packet).unwrap();
        prop_assert!(frame.len() <= packet.len() + 1);
        let decoded = decompressor.decompress(frame).unwrap();
        prop_assert_eq!(decoded.as_ref(), packet.as_slice());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_mutating_stream_roundtrip(
        initial in proptest::collection::vec(any::<u8>(), 200..1500),
        rounds in proptest::collection::vec(
            proptest::collection::vec((any::<usize>(), any::<u8>(), 0u8..3), 1..16),
            2..12,
        ),
    ) {
        let mut compressor = Compressor::new();
        let mut decompressor = Decompressor::new();
        let mut packet = initial;

        for (round, edits) in rounds.iter().enumerate() {
            for &(position, byte, op) in edits {
                let index = position % (packet.len() + 1);
                match op {
                    0 if index < packet.len() => packet[index] = byte,
                    1 if index < packet.len() && packet.len() > 1 => {
                        packet.remove(index);
                    }
                    _ => packet.insert(index, byte),
                }
            }

            let frame = compressor.compress(&packet).unwrap();
            prop_assert!(frame.len() <= packet.len() + 1, "round={} frame={} packet={}", round, frame.len(), packet.len());
            let decoded = decompressor.decompress(frame).unwrap();
            prop_assert_eq!(decoded.as_ref(), packet.as_slice());
        }

        for slot in 0..14 {
            prop_assert_eq!(compressor.bases().get(slot), decompressor.bases().get(slot));
        }
    }
}
