//! Schema-directed decoding of snapshots into user types.

use core::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::{error::TypedDecodeError, stream::StreamingDecoder};

/// Decodes every snapshot of a [`StreamingDecoder`] into `T`.
///
/// Each raw snapshot is serialised through the crate's JSON encoder and
/// re-read by `serde_json`, a deliberate round-trip that reuses any existing
/// `Deserialize` implementation instead of re-implementing schema-directed
/// decoding. Partial snapshots are the norm here, so `T` should represent
/// not-yet-arrived fields as `Option` (or provide serde defaults).
///
/// A snapshot that does not yet match the schema produces
/// [`TypedDecodeError::Schema`] without ending the stream: a later, more
/// complete snapshot may well decode. Stream errors remain fatal.
///
/// # Examples
///
/// ```
/// use jsondrip::{DecodeOptions, StreamingDecoder};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Reply {
///     text: Option<String>,
/// }
///
/// let chunks = [r#"{"text": "hi"#, r#" there"}"#];
/// let replies: Vec<Reply> = StreamingDecoder::new(chunks.into_iter(), DecodeOptions::default())
///     .typed()
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(replies.first().unwrap().text.as_deref(), Some("hi"));
/// assert_eq!(replies.last().unwrap().text.as_deref(), Some("hi there"));
/// ```
#[derive(Debug)]
pub struct TypedDecoder<S, T> {
    inner: StreamingDecoder<S>,
    _target: PhantomData<fn() -> T>,
}

impl<S, C, T> TypedDecoder<S, T>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
    T: DeserializeOwned,
{
    pub(crate) fn new(inner: StreamingDecoder<S>) -> Self {
        Self {
            inner,
            _target: PhantomData,
        }
    }

    /// Pulls the next snapshot and decodes it into `T`.
    pub fn next_value(&mut self) -> Result<Option<T>, TypedDecodeError> {
        match self.inner.next_snapshot() {
            Ok(Some(value)) => decode(&value).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(TypedDecodeError::Stream(err)),
        }
    }
}

fn decode<T: DeserializeOwned>(value: &crate::Value) -> Result<T, TypedDecodeError> {
    serde_json::from_str(&value.to_string()).map_err(TypedDecodeError::Schema)
}

impl<S, C, T> Iterator for TypedDecoder<S, T>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
    T: DeserializeOwned,
{
    type Item = Result<T, TypedDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next_snapshot() {
            Ok(Some(value)) => Some(decode(&value)),
            Ok(None) => None,
            Err(err) => Some(Err(TypedDecodeError::Stream(err))),
        }
    }
}
