//! Errors surfaced to the consumer of a snapshot stream.

use thiserror::Error;

/// A fatal decoding error.
///
/// Any of these halts the stream: the snapshot delivered before the error
/// still stands, and every subsequent pull observes the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Non-whitespace input remained after the top-level value was complete.
    #[error("unexpected trailing content: {0:?}")]
    UnexpectedTrailingContent(String),

    /// The source ended while the decoder still required input.
    #[error("unexpected end of content")]
    UnexpectedEndOfContent,

    /// A `\uXXXX` escape did not decode to a Unicode scalar value.
    #[error("invalid unicode escape sequence")]
    BadUnicodeEscape,

    /// A backslash was followed by a character that is not a JSON escape.
    #[error("invalid escape character {0:?}")]
    BadEscape(char),

    /// A number literal failed validation.
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),

    /// An array continuation was neither `,` nor `]`.
    #[error("expected ',' or ']', found {0:?}")]
    ExpectedCommaOrBracket(char),

    /// An object key position did not start with `"`.
    #[error("expected object key, found {0:?}")]
    ExpectedObjectKey(char),

    /// An object key was not followed by `:`.
    #[error("expected ':', found {0:?}")]
    ExpectedColon(char),

    /// An object continuation was neither `,` nor `}`.
    #[error("expected ',' or '}}', found {0:?}")]
    ExpectedCommaOrBrace(char),

    /// A character that cannot begin or continue the expected construct,
    /// including raw control characters inside string literals.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    /// Container nesting exceeded [`DecodeOptions::max_depth`].
    ///
    /// [`DecodeOptions::max_depth`]: crate::DecodeOptions::max_depth
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// A token arrived in an impossible parser state. This indicates a bug in
    /// the decoder, not bad input.
    #[error("internal decoder error: {0}")]
    Internal(String),
}

/// An error produced by the typed decoding facade.
///
/// Stream errors are fatal; schema errors are per-snapshot and the stream
/// continues, since a later, more complete snapshot may decode successfully.
#[cfg(feature = "serde")]
#[derive(Error, Debug)]
pub enum TypedDecodeError {
    /// The underlying snapshot stream failed; no further items will follow.
    #[error(transparent)]
    Stream(#[from] DecodeError),

    /// The snapshot did not match the target schema.
    #[error("snapshot did not match schema: {0}")]
    Schema(#[source] serde_json::Error),
}
