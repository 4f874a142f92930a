use quickcheck::QuickCheck;

use crate::{DecodeOptions, StreamingDecoder, Value};

fn test_count() -> u64 {
    if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Splits `text` into chunks derived from `splits`, character-safe.
fn partition(text: &str, splits: &[usize]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut idx = 0;
    let mut remaining = chars.len();
    for s in splits {
        if remaining == 0 {
            break;
        }
        let size = 1 + (s % remaining);
        let end = idx + size;
        chunks.push(chars[idx..end].iter().collect());
        idx = end;
        remaining -= size;
    }
    if remaining > 0 {
        chunks.push(chars[idx..].iter().collect());
    }
    chunks
}

fn stream(chunks: Vec<String>) -> Vec<Value> {
    StreamingDecoder::new(chunks.into_iter(), DecodeOptions::default())
        .collect::<Result<_, _>>()
        .expect("valid input must decode")
}

/// `next` is at least as advanced as `prev`: strings extend, arrays append or
/// update their last element, objects add keys or extend values, and nothing
/// else changes.
fn grows(prev: &Value, next: &Value) -> bool {
    match (prev, next) {
        (Value::String(a), Value::String(b)) => b.starts_with(a.as_str()),
        (Value::Array(a), Value::Array(b)) => {
            if a.len() > b.len() {
                return false;
            }
            if a.is_empty() {
                return true;
            }
            let (settled, last) = a.split_at(a.len() - 1);
            settled.iter().zip(b).all(|(x, y)| x == y) && grows(&last[0], &b[a.len() - 1])
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() > b.len() {
                return false;
            }
            // keys only ever append, in order
            if !a.keys().zip(b.keys()).all(|(x, y)| x == y) {
                return false;
            }
            a.iter().all(|(key, x)| b.get(key).is_some_and(|y| grows(x, y)))
        }
        (a, b) => a == b,
    }
}

/// Collects every object key present anywhere in `value`.
fn collect_keys(value: &Value, keys: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_keys(item, keys);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                keys.push(key.clone());
                collect_keys(item, keys);
            }
        }
        _ => {}
    }
}

/// Property: the final snapshot is independent of how the input is chunked.
#[test]
fn partition_independence_quickcheck() {
    fn prop(value: Value, splits: Vec<usize>) -> bool {
        let src = value.to_string();
        let whole = stream(vec![src.clone()]);
        let split = stream(partition(&src, &splits));
        whole.last() == split.last()
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// Property: one-character chunks produce the same final snapshot as a single
/// chunk, for inputs heavy on escapes and `\uXXXX` sequences.
#[test]
fn single_character_robustness_quickcheck() {
    fn prop(value: Value) -> bool {
        let src = value.to_string();
        let whole = stream(vec![src.clone()]);
        let single: Vec<String> = src.chars().map(String::from).collect();
        stream(single).last() == whole.last()
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: successive snapshots only ever advance.
#[test]
fn monotonicity_quickcheck() {
    fn prop(value: Value, splits: Vec<usize>) -> bool {
        let src = value.to_string();
        let snapshots = stream(partition(&src, &splits));
        snapshots.windows(2).all(|pair| grows(&pair[0], &pair[1]))
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// Property: re-encoding the final snapshot and re-parsing it, with this
/// decoder in one chunk and with serde_json as an independent batch parser,
/// reproduces the snapshot.
#[test]
fn round_trip_quickcheck() {
    fn prop(value: Value, splits: Vec<usize>) -> bool {
        let src = value.to_string();
        let final_value = stream(partition(&src, &splits)).last().cloned().unwrap();
        let encoded = final_value.to_string();
        if stream(vec![encoded.clone()]).last() != Some(&final_value) {
            return false;
        }
        serde_json::from_str::<serde_json::Value>(&encoded).is_ok()
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// Property: snapshots never expose in-progress (or complete but valueless)
/// object key text. Every key visible in any snapshot is a key of the final
/// value.
#[test]
fn key_suppression_quickcheck() {
    fn prop(value: Value, splits: Vec<usize>) -> bool {
        let src = value.to_string();
        let snapshots = stream(partition(&src, &splits));
        let mut final_keys = Vec::new();
        collect_keys(snapshots.last().unwrap(), &mut final_keys);
        snapshots.iter().all(|snapshot| {
            let mut keys = Vec::new();
            collect_keys(snapshot, &mut keys);
            keys.iter().all(|k| final_keys.contains(k))
        })
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// The streamed key never appears truncated in any snapshot, even when every
/// character arrives alone.
#[test]
fn partial_keys_never_surface() {
    let text = r#"{"alphabet": 1, "beta": {"gamma": [true]}}"#;
    let chunks: Vec<String> = text.chars().map(String::from).collect();
    let snapshots = stream(chunks);
    let allowed = ["alphabet", "beta", "gamma"];
    for snapshot in &snapshots {
        let mut keys = Vec::new();
        collect_keys(snapshot, &mut keys);
        for key in keys {
            assert!(allowed.contains(&key.as_str()), "leaked partial key {key:?}");
        }
    }
}
