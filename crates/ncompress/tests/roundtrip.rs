use ladon_core::prelude::*;
use ladon_ncompress::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Four distinct 400-byte chunks, repeated once. The repeats sit 1600 bytes back, so they are
/// only reachable once the search window grows past 0x100.
fn structured_input() -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x4C61646F6E);
    let mut chunks = vec![0u8; 1600];
    rng.fill_bytes(&mut chunks);

    let mut input = Vec::with_capacity(3200);
    input.extend_from_slice(&chunks);
    input.extend_from_slice(&chunks);
    input
}

fn random_input(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x59617A30);
    let mut input = vec![0u8; len];
    rng.fill_bytes(&mut input);
    input
}

#[test]
fn yaz0_empty_input() {
    let compressed = Yaz0::compress_from(&[], 0x1000, true).unwrap();
    assert_eq!(
        *compressed,
        [0x59, 0x61, 0x7A, 0x30, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert!(output.is_empty());
}

#[test]
fn yaz0_single_byte() {
    let compressed = Yaz0::compress_from(&[0x41], 0x1000, true).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yaz0");
    expected[7] = 1;
    expected.extend_from_slice(&[0x80, 0x41]);
    assert_eq!(*compressed, *expected);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, [0x41]);
}

#[test]
fn yaz0_pure_rle() {
    // One literal, then a single overlapping lookback covering the remaining 19 bytes
    let compressed = Yaz0::compress_from(&[0xAB; 20], 0x1000, true).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yaz0");
    expected[7] = 20;
    expected.extend_from_slice(&[0x80, 0xAB, 0x00, 0x00, 0x01]);
    assert_eq!(*compressed, *expected);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, [0xAB; 20]);
}

#[test]
fn yaz0_deferred_match_output() {
    // At offset 12 the matcher defers a four byte match, copies one byte, and takes the six
    // byte match starting at offset 13 instead
    let input = b"ABCDXBCDEFGYABCDEFG";
    let compressed = Yaz0::compress_from(input, 0x1000, true).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yaz0");
    expected[7] = input.len() as u8;
    expected.extend_from_slice(&[
        0xFB, 0x41, 0x42, 0x43, 0x44, 0x58, 0x10, 0x03, 0x45, 0x46, //first group
        0xE0, 0x47, 0x59, 0x41, 0x40, 0x07, //second group
    ]);
    assert_eq!(*compressed, *expected);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, input[..]);
}

#[test]
fn yaz0_trailing_zero_on_full_group() {
    // Eight literals fill a group exactly, so the original tools write one more zero
    let input = b"ABCDEFGH";
    let with_zero = Yaz0::compress_from(input, 0x1000, true).unwrap();
    assert_eq!(with_zero.len(), 26);
    assert_eq!(with_zero[25], 0x00);

    let without_zero = Yaz0::compress_from(input, 0x1000, false).unwrap();
    assert_eq!(without_zero.len(), 25);
    assert_eq!(*without_zero, with_zero[..25]);

    assert_eq!(*Yaz0::decompress_from(&with_zero).unwrap(), input[..]);
    assert_eq!(*Yaz0::decompress_from(&without_zero).unwrap(), input[..]);
}

#[test]
fn yaz0_no_window_copies_every_byte() {
    let compressed = Yaz0::compress_from(&[0xAB; 20], 0, true).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yaz0");
    expected[7] = 20;
    expected.push(0xFF);
    expected.extend_from_slice(&[0xAB; 8]);
    expected.push(0xFF);
    expected.extend_from_slice(&[0xAB; 8]);
    expected.push(0xF0);
    expected.extend_from_slice(&[0xAB; 4]);
    assert_eq!(*compressed, *expected);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, [0xAB; 20]);
}

#[test]
fn yaz0_long_runs_split_at_max_length() {
    let input = [0x77; 5000];
    let compressed = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    assert!(compressed.len() < 100);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, input[..]);
}

#[test]
fn yaz0_round_trips_at_every_depth() {
    let input = random_input(4096);
    for depth in [0x100, 0x1000, 0x10000] {
        let compressed = Yaz0::compress_from(&input, depth, true).unwrap();
        assert_eq!(
            u32::from_be_bytes([compressed[4], compressed[5], compressed[6], compressed[7]]),
            4096
        );
        assert!(compressed.len() <= 0x10 + 4096 + 4096 / 8 + 1);

        let output = Yaz0::decompress_from(&compressed).unwrap();
        assert_eq!(output.len(), 4096);
        assert_eq!(*output, input[..]);
    }
}

#[test]
fn yaz0_deeper_search_never_compresses_worse() {
    let input = structured_input();
    let shallow = Yaz0::compress_from(&input, 0x100, true).unwrap();
    let deep = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    let deepest = Yaz0::compress_from(&input, 0x10000, true).unwrap();

    // The repeated half only matches once the window reaches back 1600 bytes
    assert!(shallow.len() > deep.len());
    assert!(deep.len() >= deepest.len());

    assert_eq!(*Yaz0::decompress_from(&shallow).unwrap(), input[..]);
    assert_eq!(*Yaz0::decompress_from(&deep).unwrap(), input[..]);
    assert_eq!(*Yaz0::decompress_from(&deepest).unwrap(), input[..]);
}

#[test]
fn yaz0_compression_is_deterministic() {
    let input = structured_input();
    let first = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    let second = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn yaz0_ignores_magic_and_trailing_bytes() {
    let input = structured_input();
    let mut compressed = Yaz0::compress_from(&input, 0x1000, true).unwrap().into_vec();
    compressed[0..4].copy_from_slice(b"AAAA");
    compressed.extend_from_slice(&[0xFF; 3]);

    let output = Yaz0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, input[..]);
}

#[test]
fn yaz0_rejects_invalid_input() {
    assert!(matches!(
        Yaz0::decompress_from(&[0u8; 10]),
        Err(yaz0::Error::InvalidHeader)
    ));

    // Eight literals cut off after the third one
    let compressed = Yaz0::compress_from(b"ABCDEFGH", 0x1000, true).unwrap();
    assert!(matches!(
        Yaz0::decompress_from(&compressed[..20]),
        Err(yaz0::Error::EndOfFile)
    ));

    // A lookback as the first block has nothing to copy from
    let mut corrupt = vec![0u8; 0x10];
    corrupt[0..4].copy_from_slice(b"Yaz0");
    corrupt[7] = 3;
    corrupt.extend_from_slice(&[0x00, 0x10, 0x00]);
    assert!(matches!(
        Yaz0::decompress_from(&corrupt),
        Err(yaz0::Error::CorruptLookback)
    ));

    // A literal followed by a lookback running past the advertised output size
    let mut overrun = vec![0u8; 0x10];
    overrun[0..4].copy_from_slice(b"Yaz0");
    overrun[7] = 4;
    overrun.extend_from_slice(&[0x80, 0x41, 0x20, 0x00]);
    assert!(matches!(
        Yaz0::decompress_from(&overrun),
        Err(yaz0::Error::EndOfFile)
    ));
}

#[test]
fn yay0_empty_input() {
    let compressed = Yay0::compress_from(&[], 0x1000).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yay0");
    expected[11] = 0x10;
    expected[15] = 0x10;
    assert_eq!(*compressed, *expected);

    let output = Yay0::decompress_from(&compressed).unwrap();
    assert!(output.is_empty());
}

#[test]
fn yay0_single_byte() {
    let compressed = Yay0::compress_from(&[0x41], 0x1000).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yay0");
    expected[7] = 1;
    expected[11] = 0x14;
    expected[15] = 0x14;
    expected.extend_from_slice(&[0x80, 0x00, 0x00, 0x00, 0x41]);
    assert_eq!(*compressed, *expected);

    let output = Yay0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, [0x41]);
}

#[test]
fn yay0_pure_rle() {
    let compressed = Yay0::compress_from(&[0xAB; 20], 0x1000).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yay0");
    expected[7] = 20;
    expected[11] = 0x14;
    expected[15] = 0x16;
    expected.extend_from_slice(&[0x80, 0x00, 0x00, 0x00]); //mask
    expected.extend_from_slice(&[0x00, 0x00]); //lookback
    expected.extend_from_slice(&[0xAB, 0x01]); //copy data
    assert_eq!(*compressed, *expected);

    let output = Yay0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, [0xAB; 20]);
}

#[test]
fn yay0_deferred_match_output() {
    let input = b"ABCDXBCDEFGYABCDEFG";
    let compressed = Yay0::compress_from(input, 0x1000).unwrap();
    let mut expected = vec![0u8; 0x10];
    expected[0..4].copy_from_slice(b"Yay0");
    expected[7] = input.len() as u8;
    expected[11] = 0x14;
    expected[15] = 0x18;
    expected.extend_from_slice(&[0xFB, 0xE0, 0x00, 0x00]); //mask
    expected.extend_from_slice(&[0x10, 0x03, 0x40, 0x07]); //lookback
    expected.extend_from_slice(&[
        0x41, 0x42, 0x43, 0x44, 0x58, 0x45, 0x46, 0x47, 0x59, 0x41, //copy data
    ]);
    assert_eq!(*compressed, *expected);

    let output = Yay0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, input[..]);
}

#[test]
fn yay0_long_runs_split_at_max_length() {
    let input = [0x77; 5000];
    let compressed = Yay0::compress_from(&input, 0x1000).unwrap();
    assert!(compressed.len() < 100);

    let output = Yay0::decompress_from(&compressed).unwrap();
    assert_eq!(*output, input[..]);
}

#[test]
fn yay0_round_trips_at_every_depth() {
    let input = random_input(4096);
    for depth in [0x100, 0x1000, 0x10000] {
        let compressed = Yay0::compress_from(&input, depth).unwrap();
        assert_eq!(
            u32::from_be_bytes([compressed[4], compressed[5], compressed[6], compressed[7]]),
            4096
        );

        let output = Yay0::decompress_from(&compressed).unwrap();
        assert_eq!(output.len(), 4096);
        assert_eq!(*output, input[..]);
    }
}

#[test]
fn yay0_section_offsets_are_consistent() {
    let input = structured_input();
    let compressed = Yay0::compress_from(&input, 0x1000).unwrap();
    let header = Yay0::read_header(&compressed).unwrap();

    assert_eq!(header.decompressed_size as usize, input.len());
    // The mask section is whole big-endian words starting right after the header
    assert!(header.lookback_offset >= 0x10);
    assert_eq!((header.lookback_offset - 0x10) % 4, 0);
    // The lookback section is two bytes per match
    assert!(header.copy_data_offset >= header.lookback_offset);
    assert_eq!((header.copy_data_offset - header.lookback_offset) % 2, 0);
    assert!((header.copy_data_offset as usize) <= compressed.len());
}

#[test]
fn yay0_deeper_search_never_compresses_worse() {
    let input = structured_input();
    let shallow = Yay0::compress_from(&input, 0x100).unwrap();
    let deep = Yay0::compress_from(&input, 0x1000).unwrap();
    let deepest = Yay0::compress_from(&input, 0x10000).unwrap();

    assert!(shallow.len() > deep.len());
    assert!(deep.len() >= deepest.len());

    assert_eq!(*Yay0::decompress_from(&shallow).unwrap(), input[..]);
    assert_eq!(*Yay0::decompress_from(&deep).unwrap(), input[..]);
    assert_eq!(*Yay0::decompress_from(&deepest).unwrap(), input[..]);
}

#[test]
fn yay0_compression_is_deterministic() {
    let input = structured_input();
    let first = Yay0::compress_from(&input, 0x1000).unwrap();
    let second = Yay0::compress_from(&input, 0x1000).unwrap();
    assert_eq!(first, second);
}

#[test]
fn yay0_rejects_invalid_input() {
    assert!(matches!(
        Yay0::decompress_from(&[0u8; 10]),
        Err(yay0::Error::InvalidHeader)
    ));

    // A lookback as the first block has nothing to copy from
    let mut corrupt = vec![0u8; 0x10];
    corrupt[0..4].copy_from_slice(b"Yay0");
    corrupt[7] = 3;
    corrupt[11] = 0x14;
    corrupt[15] = 0x16;
    corrupt.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); //mask
    corrupt.extend_from_slice(&[0x10, 0x00]); //lookback
    assert!(matches!(
        Yay0::decompress_from(&corrupt),
        Err(yay0::Error::CorruptLookback)
    ));

    // Mask claims a literal but the copy data section is missing
    let mut truncated = vec![0u8; 0x10];
    truncated[0..4].copy_from_slice(b"Yay0");
    truncated[7] = 1;
    truncated[11] = 0x14;
    truncated[15] = 0x14;
    truncated.extend_from_slice(&[0x80, 0x00, 0x00, 0x00]); //mask
    assert!(matches!(
        Yay0::decompress_from(&truncated),
        Err(yay0::Error::EndOfFile)
    ));
}

#[test]
fn cross_format_output_matches() {
    // Both formats share the matcher, so they must make the same literal/lookback decisions
    let input = structured_input();
    let yaz0 = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    let yay0 = Yay0::compress_from(&input, 0x1000).unwrap();
    assert_eq!(
        *Yaz0::decompress_from(&yaz0).unwrap(),
        *Yay0::decompress_from(&yay0).unwrap()
    );
}

#[test]
fn identify_reports_both_formats() {
    let input = structured_input();

    let compressed = Yaz0::compress_from(&input, 0x1000, true).unwrap();
    let info = Yaz0::identify(&compressed).unwrap();
    assert_eq!(info.format, "Yaz0");
    assert_eq!(info.decompressed_size, input.len());
    assert!(info.to_string().contains("Yaz0-compressed"));
    let deep = Yaz0::identify_deep(&compressed).unwrap();
    assert_eq!(*deep.payload.unwrap(), input[..]);
    assert!(Yay0::identify(&compressed).is_none());

    let compressed = Yay0::compress_from(&input, 0x1000).unwrap();
    let info = Yay0::identify(&compressed).unwrap();
    assert_eq!(info.format, "Yay0");
    assert_eq!(info.decompressed_size, input.len());
    assert!(Yaz0::identify(&compressed).is_none());
}

#[test]
fn random_blobs_never_overrun_their_header() {
    let mut rng = StdRng::seed_from_u64(0x59617930);
    for _ in 0..256 {
        let len = rng.gen_range(16..1024);
        let mut blob = vec![0u8; len];
        rng.fill_bytes(&mut blob);

        // Keep the advertised output small so a blob that happens to decode stays cheap
        let size = rng.gen_range(0u32..2048);
        blob[4..8].copy_from_slice(&size.to_be_bytes());

        if let Ok(output) = Yaz0::decompress_from(&blob) {
            assert_eq!(output.len(), size as usize);
        }
        if let Ok(output) = Yay0::decompress_from(&blob) {
            assert_eq!(output.len(), size as usize);
        }
    }
}
