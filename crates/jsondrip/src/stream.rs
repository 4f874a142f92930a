//! The pull-based snapshot stream facade.

use crate::{
    builder::SnapshotBuilder,
    error::DecodeError,
    options::DecodeOptions,
    source::Utf8Chunks,
    tokenizer::Tokenizer,
    value::Value,
};

/// An incremental JSON decoder producing a sequence of snapshots of the
/// growing top-level value.
///
/// Input arrives as text chunks pulled from an iterator; chunk boundaries may
/// fall anywhere, including inside keys, escape sequences and numbers. Each
/// call to [`next_snapshot`] pumps the tokenizer until the value has made
/// *meaningful* progress (a new value token, or a value string extending)
/// and returns an immutable copy of the current top-level value. Snapshots
/// only ever grow: fields never revert and no key disappears.
///
/// The final snapshot is delivered twice at end of stream (once when the
/// closing token arrives and once when the input's tail has been validated);
/// consumers must tolerate the duplicate.
///
/// # Examples
///
/// ```
/// use jsondrip::{DecodeOptions, StreamingDecoder, Value};
///
/// let chunks = [r#"{"msg": "he"#, r#"llo"}"#];
/// let snapshots: Vec<Value> = StreamingDecoder::new(chunks.into_iter(), DecodeOptions::default())
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(snapshots.first().unwrap().to_string(), r#"{"msg":"he"}"#);
/// assert_eq!(snapshots.last().unwrap().to_string(), r#"{"msg":"hello"}"#);
/// ```
#[derive(Debug)]
pub struct StreamingDecoder<S> {
    tokenizer: Tokenizer<S>,
    builder: SnapshotBuilder,
    finished: bool,
    failed: bool,
}

impl<S, C> StreamingDecoder<S>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
{
    /// Creates a decoder over a pull-based sequence of text chunks.
    pub fn new(source: S, options: DecodeOptions) -> Self {
        Self {
            tokenizer: Tokenizer::new(source, options),
            builder: SnapshotBuilder::new(),
            finished: false,
            failed: false,
        }
    }

    /// Pulls the next snapshot.
    ///
    /// Returns `Ok(None)` once the stream has completed (or after a previous
    /// error). Errors are fatal to the stream: snapshots already returned
    /// stand, but no further snapshots follow.
    pub fn next_snapshot(&mut self) -> Result<Option<Value>, DecodeError> {
        if self.finished || self.failed {
            return Ok(None);
        }
        match self.advance() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<Value, DecodeError> {
        loop {
            self.builder.begin_pump();
            self.tokenizer.pump(&mut self.builder)?;
            if self.builder.root().is_none() {
                return Err(DecodeError::Internal(
                    "pump returned without producing a value".to_string(),
                ));
            }
            if self.builder.progressed() {
                return self.current();
            }
            if self.builder.is_complete() {
                // One more pump to validate any trailing input.
                self.tokenizer.pump(&mut self.builder)?;
                debug_assert!(self.tokenizer.is_done());
                self.finished = true;
                return self.current();
            }
        }
    }

    fn current(&self) -> Result<Value, DecodeError> {
        self.builder
            .root()
            .cloned()
            .ok_or_else(|| DecodeError::Internal("snapshot requested before any value".to_string()))
    }
}

impl<'a> StreamingDecoder<core::iter::Once<&'a str>> {
    /// Decodes a complete text in a single chunk. Mostly useful for tests and
    /// for batch re-parsing of encoded snapshots.
    pub fn from_text(text: &'a str, options: DecodeOptions) -> Self {
        Self::new(core::iter::once(text), options)
    }
}

impl<I: Iterator<Item = u8>> StreamingDecoder<Utf8Chunks<I>> {
    /// Decodes a byte stream, feeding the tokenizer one scalar at a time.
    pub fn from_bytes(bytes: I, options: DecodeOptions) -> Self {
        Self::new(Utf8Chunks::new(bytes), options)
    }
}

#[cfg(feature = "serde")]
impl<S, C> StreamingDecoder<S>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
{
    /// Converts the stream into one that decodes every snapshot into `T`.
    ///
    /// See [`TypedDecoder`] for the decoding contract.
    ///
    /// [`TypedDecoder`]: crate::TypedDecoder
    pub fn typed<T: serde::de::DeserializeOwned>(self) -> crate::typed::TypedDecoder<S, T> {
        crate::typed::TypedDecoder::new(self)
    }
}

impl<S, C> Iterator for StreamingDecoder<S>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
{
    type Item = Result<Value, DecodeError>;

    /// Yields snapshots until the stream completes; an error ends the
    /// iteration after it is returned once.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_snapshot() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
