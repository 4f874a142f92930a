#![no_main]

use jsondrip::{DecodeOptions, StreamingDecoder};
use libfuzzer_sys::fuzz_target;

const HEADER: usize = 5; // 1 option byte + 4-byte split seed

fn decoder(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as u64;
    let data = &data[5..];
    if data.is_empty() {
        return;
    }

    let text = String::from_utf8_lossy(data).into_owned();
    let options = DecodeOptions {
        max_depth: if flags & 1 != 0 { Some(64) } else { None },
    };

    // Byte-at-a-time through the UTF-8 adapter on one bit, seeded chunk
    // partition on the other: both must terminate without panicking,
    // returning snapshots or an error.
    if flags & 2 != 0 {
        for _ in StreamingDecoder::from_bytes(data.iter().copied(), options) {}
    } else {
        let chunks = split_into_safe_chunks(&text, split_seed);
        for _ in StreamingDecoder::new(chunks.into_iter(), options) {}
    }
}

fuzz_target!(|data: &[u8]| decoder(data));

/// Split a UTF-8 `&str` into boundary-safe chunks using a deterministic random
/// value to generate splits.
///
/// * `split_seed` may be any `u64`.
/// * Each chunk is at least one byte.
/// * Every slice ends on a valid UTF-8 boundary, so it can’t panic.
fn split_into_safe_chunks(serialized: &str, split_seed: u64) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let len = serialized.len();

    while start < len {
        let remaining = len - start;

        // Derive a candidate size from the fixed seed.
        let mut size = (split_seed as usize % remaining) + 1;

        // Bump `size` forward until it lands on a char boundary
        // (or hits the end of the string, which is always a boundary).
        while start + size < len && !serialized.is_char_boundary(start + size) {
            size += 1;
        }

        chunks.push(&serialized[start..start + size]);
        start += size;
    }

    chunks
}
