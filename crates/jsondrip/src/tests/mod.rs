mod property_partition;

use crate::{DecodeError, DecodeOptions, StreamingDecoder, Value};

/// Decodes `chunks`, returning every snapshot in order.
pub(crate) fn snapshots(chunks: &[&str]) -> Result<Vec<Value>, DecodeError> {
    StreamingDecoder::new(chunks.iter().copied(), DecodeOptions::default()).collect()
}

/// Decodes `chunks` and returns only the final snapshot.
pub(crate) fn decode(chunks: &[&str]) -> Result<Value, DecodeError> {
    let all = snapshots(chunks)?;
    Ok(all.last().expect("at least one snapshot").clone())
}

/// Splits `text` into `parts` at character granularity, then decodes.
pub(crate) fn decode_split(text: &str, sizes: &[usize]) -> Result<Value, DecodeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut idx = 0;
    for &size in sizes {
        let end = (idx + size.max(1)).min(chars.len());
        chunks.push(chars[idx..end].iter().collect::<String>());
        idx = end;
        if idx == chars.len() {
            break;
        }
    }
    if idx < chars.len() {
        chunks.push(chars[idx..].iter().collect::<String>());
    }
    let all: Vec<Value> =
        StreamingDecoder::new(chunks.into_iter(), DecodeOptions::default()).collect::<Result<_, _>>()?;
    Ok(all.last().expect("at least one snapshot").clone())
}
