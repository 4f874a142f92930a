/// Configuration options for the snapshot decoder.
///
/// # Examples
///
/// ```rust
/// use jsondrip::{DecodeOptions, StreamingDecoder};
///
/// let decoder = StreamingDecoder::new(
///     ["[1, 2, 3]"].into_iter(),
///     DecodeOptions {
///         max_depth: Some(16),
///         ..DecodeOptions::default()
///     },
/// );
/// # let _ = decoder;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum container nesting depth, or `None` for no limit.
    ///
    /// Opening an array or object beyond this depth fails with
    /// [`DecodeError::RecursionLimitExceeded`]. The default of 128 comfortably
    /// admits any payload a streaming UI will encounter while bounding stack
    /// growth on adversarial input.
    ///
    /// [`DecodeError::RecursionLimitExceeded`]: crate::DecodeError::RecursionLimitExceeded
    pub max_depth: Option<usize>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(128),
        }
    }
}
