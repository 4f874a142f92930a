//! Incremental JSON decoding for streams that arrive in arbitrary chunks.
//!
//! `jsondrip` consumes a pull-based sequence of text (or byte) chunks and
//! produces a sequence of *snapshots*: immutable views of the growing
//! top-level JSON value, published at every moment of meaningful progress.
//! A chat UI can render a model response field by field (and character by
//! character inside long strings) long before the payload is complete.
//!
//! Chunk boundaries carry no meaning: input may split inside keys, escape
//! sequences, numbers or keywords and the decoder suspends and resumes at any
//! character boundary without losing state.
//!
//! # Examples
//!
//! ```
//! use jsondrip::{DecodeOptions, StreamingDecoder};
//!
//! let chunks = [r#"{"answer": [4"#, r#"2], "note": "par"#, r#"tial"}"#];
//! let mut decoder = StreamingDecoder::new(chunks.into_iter(), DecodeOptions::default());
//!
//! let mut last = None;
//! while let Some(snapshot) = decoder.next_snapshot().unwrap() {
//!     last = Some(snapshot);
//! }
//! assert_eq!(
//!     last.unwrap().to_string(),
//!     r#"{"answer":[42],"note":"partial"}"#
//! );
//! ```
//!
//! With the `serde` feature (on by default) snapshots can be decoded straight
//! into a user type whose not-yet-arrived fields are `Option`s; see
//! [`TypedDecoder`].

mod buffer;
mod builder;
mod error;
mod escape;
mod options;
mod source;
mod stream;
mod token;
mod tokenizer;
#[cfg(feature = "serde")]
mod typed;
mod value;

pub use error::DecodeError;
#[cfg(feature = "serde")]
pub use error::TypedDecodeError;
pub use options::DecodeOptions;
pub use source::{CharChunk, Utf8Chunks};
pub use stream::StreamingDecoder;
#[cfg(feature = "serde")]
pub use typed::TypedDecoder;
pub use value::{Array, Map, Value};

#[cfg(test)]
mod tests;
