//! The chunk-driven JSON tokenizer.
//!
//! The tokenizer owns the input window and a stack of lexer frames, one per
//! syntactic context it is inside of. It can suspend at any character
//! boundary: when the buffered input runs out mid-construct the current step
//! simply reports that it needs more data, and the next [`pump`] resumes from
//! the identical state once another chunk has arrived.
//!
//! [`pump`]: Tokenizer::pump

use crate::{
    buffer::ChunkBuffer,
    error::DecodeError,
    escape,
    options::DecodeOptions,
    token::{Token, TokenSink},
};

/// Lexer context, one frame per unfinished construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexFrame {
    /// A value may begin here.
    ExpectingValue,
    /// Between the quotes of a string literal.
    InString,
    /// Just past `[`, before the first element or `]`.
    StartArray,
    /// Past an array element, before `,` or `]`.
    AfterArrayValue,
    /// Just past `{`, before the first key or `}`.
    StartObject,
    /// Past a key string, before `:`.
    AfterObjectKey,
    /// Past a member value, before `,` or `}`.
    AfterObjectValue,
    /// Past a `,` inside an object, before the next key.
    BeforeObjectKey,
}

/// Outcome of a single state-machine step.
enum Step {
    /// Consumed input and/or emitted tokens; keep stepping.
    Progress,
    /// Blocked on the window end; the caller decides whether to pull.
    NeedMore,
}

#[derive(Debug)]
pub(crate) struct Tokenizer<S> {
    buffer: ChunkBuffer<S>,
    stack: Vec<LexFrame>,
    /// Open containers, checked against `max_depth`.
    depth: usize,
    max_depth: Option<usize>,
    /// Tokens emitted over the tokenizer's lifetime.
    emitted: usize,
}

impl<S, C> Tokenizer<S>
where
    S: Iterator<Item = C>,
    C: AsRef<str>,
{
    pub(crate) fn new(source: S, options: DecodeOptions) -> Self {
        Self {
            buffer: ChunkBuffer::new(source),
            stack: vec![LexFrame::ExpectingValue],
            depth: 0,
            max_depth: options.max_depth,
            emitted: 0,
        }
    }

    /// True once the input has fully tokenized and the window is drained.
    pub(crate) fn is_done(&self) -> bool {
        self.stack.is_empty() && self.buffer.len() == 0
    }

    /// Runs the state machine until at least one token has been emitted
    /// during this call, or the stream has terminated and its tail validated.
    ///
    /// All buffered input that can be consumed is consumed before returning,
    /// so a single pump routinely emits several tokens. The upstream source
    /// is pulled only when nothing buffered can make progress.
    pub(crate) fn pump<H: TokenSink>(&mut self, sink: &mut H) -> Result<(), DecodeError> {
        let emitted_at_entry = self.emitted;
        let mut stalled = false;
        loop {
            if self.stack.is_empty() {
                self.buffer.expect_end_of_content()?;
                self.buffer.commit();
                return Ok(());
            }
            match self.step(sink)? {
                Step::Progress => stalled = false,
                Step::NeedMore => {
                    if self.emitted > emitted_at_entry {
                        self.buffer.commit();
                        return Ok(());
                    }
                    if !self.buffer.try_expand()? {
                        // Exhausted source during number lexing; the next
                        // step finalises the literal against the closed
                        // window. Anything else here is a decoder bug.
                        if stalled {
                            return Err(DecodeError::Internal(
                                "tokenizer stalled on exhausted input".to_string(),
                            ));
                        }
                        stalled = true;
                    }
                }
            }
        }
    }

    fn emit<H: TokenSink>(&mut self, sink: &mut H, token: Token) -> Result<(), DecodeError> {
        self.emitted += 1;
        sink.token(token)
    }

    fn open_container(&mut self) -> Result<(), DecodeError> {
        self.depth += 1;
        if self.max_depth.is_some_and(|max| self.depth > max) {
            return Err(DecodeError::RecursionLimitExceeded);
        }
        Ok(())
    }

    fn step<H: TokenSink>(&mut self, sink: &mut H) -> Result<Step, DecodeError> {
        let frame = *self
            .stack
            .last()
            .ok_or_else(|| DecodeError::Internal("step on empty lexer stack".to_string()))?;
        match frame {
            LexFrame::ExpectingValue => self.lex_value(sink),
            LexFrame::InString => self.lex_string(sink),

            LexFrame::StartArray => {
                self.buffer.skip_whitespace();
                match self.buffer.peek(0) {
                    None => Ok(Step::NeedMore),
                    Some(']') => {
                        self.buffer.advance(1);
                        self.stack.pop();
                        self.depth -= 1;
                        self.emit(sink, Token::ArrayEnd)?;
                        Ok(Step::Progress)
                    }
                    Some(_) => {
                        self.stack.pop();
                        self.stack.push(LexFrame::AfterArrayValue);
                        self.stack.push(LexFrame::ExpectingValue);
                        Ok(Step::Progress)
                    }
                }
            }

            LexFrame::AfterArrayValue => {
                self.buffer.skip_whitespace();
                match self.buffer.try_take_char() {
                    None => Ok(Step::NeedMore),
                    Some(']') => {
                        self.stack.pop();
                        self.depth -= 1;
                        self.emit(sink, Token::ArrayEnd)?;
                        Ok(Step::Progress)
                    }
                    Some(',') => {
                        self.stack.push(LexFrame::ExpectingValue);
                        Ok(Step::Progress)
                    }
                    Some(c) => Err(DecodeError::ExpectedCommaOrBracket(c)),
                }
            }

            LexFrame::StartObject => {
                self.buffer.skip_whitespace();
                match self.buffer.try_take_char() {
                    None => Ok(Step::NeedMore),
                    Some('}') => {
                        self.stack.pop();
                        self.depth -= 1;
                        self.emit(sink, Token::ObjectEnd)?;
                        Ok(Step::Progress)
                    }
                    Some('"') => {
                        self.stack.pop();
                        self.stack.push(LexFrame::AfterObjectKey);
                        self.stack.push(LexFrame::InString);
                        self.emit(sink, Token::StringStart)?;
                        Ok(Step::Progress)
                    }
                    Some(c) => Err(DecodeError::ExpectedObjectKey(c)),
                }
            }

            LexFrame::AfterObjectKey => {
                self.buffer.skip_whitespace();
                match self.buffer.try_take_char() {
                    None => Ok(Step::NeedMore),
                    Some(':') => {
                        self.stack.pop();
                        self.stack.push(LexFrame::AfterObjectValue);
                        self.stack.push(LexFrame::ExpectingValue);
                        Ok(Step::Progress)
                    }
                    Some(c) => Err(DecodeError::ExpectedColon(c)),
                }
            }

            LexFrame::AfterObjectValue => {
                self.buffer.skip_whitespace();
                match self.buffer.try_take_char() {
                    None => Ok(Step::NeedMore),
                    Some('}') => {
                        self.stack.pop();
                        self.depth -= 1;
                        self.emit(sink, Token::ObjectEnd)?;
                        Ok(Step::Progress)
                    }
                    Some(',') => {
                        self.stack.pop();
                        self.stack.push(LexFrame::BeforeObjectKey);
                        Ok(Step::Progress)
                    }
                    Some(c) => Err(DecodeError::ExpectedCommaOrBrace(c)),
                }
            }

            LexFrame::BeforeObjectKey => {
                self.buffer.skip_whitespace();
                match self.buffer.try_take_char() {
                    None => Ok(Step::NeedMore),
                    Some('"') => {
                        self.stack.pop();
                        self.stack.push(LexFrame::AfterObjectKey);
                        self.stack.push(LexFrame::InString);
                        self.emit(sink, Token::StringStart)?;
                        Ok(Step::Progress)
                    }
                    Some(c) => Err(DecodeError::ExpectedObjectKey(c)),
                }
            }
        }
    }

    fn lex_value<H: TokenSink>(&mut self, sink: &mut H) -> Result<Step, DecodeError> {
        self.buffer.skip_whitespace();
        let Some(c) = self.buffer.peek(0) else {
            return Ok(Step::NeedMore);
        };
        match c {
            'n' => self.lex_keyword(sink, "null", Token::Null),
            't' => self.lex_keyword(sink, "true", Token::Boolean(true)),
            'f' => self.lex_keyword(sink, "false", Token::Boolean(false)),
            '-' | '0'..='9' => self.lex_number(sink),
            '"' => {
                self.buffer.advance(1);
                self.stack.pop();
                self.stack.push(LexFrame::InString);
                self.emit(sink, Token::StringStart)?;
                Ok(Step::Progress)
            }
            '[' => {
                self.buffer.advance(1);
                self.open_container()?;
                self.stack.pop();
                self.stack.push(LexFrame::StartArray);
                self.emit(sink, Token::ArrayStart)?;
                Ok(Step::Progress)
            }
            '{' => {
                self.buffer.advance(1);
                self.open_container()?;
                self.stack.pop();
                self.stack.push(LexFrame::StartObject);
                self.emit(sink, Token::ObjectStart)?;
                Ok(Step::Progress)
            }
            c => Err(DecodeError::InvalidCharacter(c)),
        }
    }

    /// Matches `null`, `true` or `false`. A window that holds only a proper
    /// prefix of the keyword defers until more input arrives.
    fn lex_keyword<H: TokenSink>(
        &mut self,
        sink: &mut H,
        keyword: &'static str,
        token: Token,
    ) -> Result<Step, DecodeError> {
        for (i, expected) in keyword.chars().enumerate() {
            match self.buffer.peek(i) {
                None => return Ok(Step::NeedMore),
                Some(c) if c == expected => {}
                Some(c) => return Err(DecodeError::InvalidCharacter(c)),
            }
        }
        let taken = self.buffer.try_take_prefix(keyword);
        debug_assert!(taken, "keyword verified above");
        self.stack.pop();
        self.emit(sink, token)?;
        Ok(Step::Progress)
    }

    /// Scans the contiguous run of number characters. If the run touches the
    /// window end while the source may still produce input, exhaustion is
    /// made acceptable and the scan retried on the next pump; an end of
    /// stream inside a number finalises it instead.
    fn lex_number<H: TokenSink>(&mut self, sink: &mut H) -> Result<Step, DecodeError> {
        let mut n = 0;
        while let Some(c) = self.buffer.peek(n) {
            if matches!(c, '0'..='9' | '+' | '-' | '.' | 'e' | 'E') {
                n += 1;
            } else {
                break;
            }
        }
        if self.buffer.peek(n).is_none() && !self.buffer.is_exhausted() {
            self.buffer.set_more_content_expected(false);
            return Ok(Step::NeedMore);
        }
        let text = self.buffer.slice(0, n);
        self.buffer.advance(n);
        self.buffer.set_more_content_expected(true);
        if !is_valid_number(&text) {
            return Err(DecodeError::InvalidNumber(text));
        }
        let value: f64 = text
            .parse()
            .map_err(|_| DecodeError::InvalidNumber(text.clone()))?;
        self.stack.pop();
        self.emit(sink, Token::Number(value))?;
        Ok(Step::Progress)
    }

    fn lex_string<H: TokenSink>(&mut self, sink: &mut H) -> Result<Step, DecodeError> {
        let (text, hit_delimiter) = self.buffer.take_until_quote_or_backslash()?;
        let mut progressed = false;
        if !text.is_empty() {
            progressed = true;
            self.emit(sink, Token::StringMiddle(text))?;
        }
        if !hit_delimiter {
            return Ok(if progressed { Step::Progress } else { Step::NeedMore });
        }
        match self.buffer.peek(0) {
            Some('"') => {
                self.buffer.advance(1);
                self.stack.pop();
                self.emit(sink, Token::StringEnd)?;
                Ok(Step::Progress)
            }
            Some('\\') => self.lex_escape(sink, progressed),
            _ => Err(DecodeError::Internal(
                "string delimiter vanished from the window".to_string(),
            )),
        }
    }

    /// Decodes one escape sequence. The window must hold the whole sequence
    /// (two characters, six for `\uXXXX`, twelve for a surrogate pair) before
    /// anything is consumed, so a chunk boundary can never split a decode.
    fn lex_escape<H: TokenSink>(
        &mut self,
        sink: &mut H,
        progressed: bool,
    ) -> Result<Step, DecodeError> {
        let pending = if progressed { Step::Progress } else { Step::NeedMore };
        let Some(c) = self.buffer.peek(1) else {
            return Ok(pending);
        };
        if c == 'u' {
            return self.lex_unicode_escape(sink, pending);
        }
        match escape::short_escape(c) {
            Some(decoded) => {
                self.buffer.advance(2);
                self.emit(sink, Token::StringMiddle(decoded.to_string()))?;
                Ok(Step::Progress)
            }
            None => Err(DecodeError::BadEscape(c)),
        }
    }

    fn lex_unicode_escape<H: TokenSink>(
        &mut self,
        sink: &mut H,
        pending: Step,
    ) -> Result<Step, DecodeError> {
        if self.buffer.len() < 6 {
            return Ok(pending);
        }
        let code = escape::parse_hex4(&self.buffer.slice(2, 6))?;
        if escape::is_high_surrogate(code) {
            // The low half must follow immediately as another \uXXXX escape;
            // the two halves decode to a single scalar.
            if self.buffer.len() < 8 {
                if self.buffer.is_exhausted() {
                    return Err(DecodeError::BadUnicodeEscape);
                }
                return Ok(pending);
            }
            if self.buffer.slice(6, 8) != "\\u" {
                return Err(DecodeError::BadUnicodeEscape);
            }
            if self.buffer.len() < 12 {
                if self.buffer.is_exhausted() {
                    return Err(DecodeError::BadUnicodeEscape);
                }
                return Ok(pending);
            }
            let low = escape::parse_hex4(&self.buffer.slice(8, 12))?;
            let combined = escape::combine_surrogates(code, low)?;
            self.buffer.advance(12);
            self.emit(sink, Token::StringMiddle(combined.to_string()))?;
            return Ok(Step::Progress);
        }
        // Lone low surrogates land here: they are no valid scalar.
        let decoded = char::from_u32(code).ok_or(DecodeError::BadUnicodeEscape)?;
        self.buffer.advance(6);
        self.emit(sink, Token::StringMiddle(decoded.to_string()))?;
        Ok(Step::Progress)
    }
}

/// Validates a scanned number literal against the JSON grammar:
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
fn is_valid_number(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    match chars.next() {
        Some('0') => {}
        Some('1'..='9') => {
            while matches!(chars.peek(), Some('0'..='9')) {
                chars.next();
            }
        }
        _ => return false,
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        if !matches!(chars.peek(), Some('0'..='9')) {
            return false;
        }
        while matches!(chars.peek(), Some('0'..='9')) {
            chars.next();
        }
    }
    if matches!(chars.peek(), Some('e' | 'E')) {
        chars.next();
        if matches!(chars.peek(), Some('+' | '-')) {
            chars.next();
        }
        if !matches!(chars.peek(), Some('0'..='9')) {
            return false;
        }
        while matches!(chars.peek(), Some('0'..='9')) {
            chars.next();
        }
    }
    chars.next().is_none()
}
