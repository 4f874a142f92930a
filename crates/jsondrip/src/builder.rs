//! The snapshot builder: turns the token stream into a growing value.
//!
//! The builder mirrors the tokenizer with its own stack of parser frames and
//! owns a live container node per open array or object. Every mutation of a
//! leaf is propagated up the frame stack so the published top-level value
//! always reflects the live leaves. The builder also decides what counts as
//! *meaningful* progress: any value token, or any extension of a string that
//! is not currently serving as an object key. Text accumulating toward a key
//! is therefore never visible in a snapshot.

use crate::{
    error::DecodeError,
    token::{Token, TokenSink},
    value::{Map, Value},
};

/// A mutable array node referenced from the parser stack.
#[derive(Debug, Default)]
struct LiveArray {
    items: Vec<Value>,
}

impl LiveArray {
    fn append(&mut self, value: Value) {
        self.items.push(value);
    }

    fn replace_last(&mut self, value: Value) -> Result<(), DecodeError> {
        match self.items.last_mut() {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DecodeError::Internal(
                "replace_last on an empty live array".to_string(),
            )),
        }
    }

    fn to_value(&self) -> Value {
        Value::Array(self.items.clone())
    }
}

/// A mutable object node. Keys keep first-insertion order; overwriting an
/// existing key leaves its position untouched.
#[derive(Debug, Default)]
struct LiveObject {
    entries: Map,
}

impl LiveObject {
    fn set(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.entries.get_mut(key) {
            *slot = value;
        } else {
            self.entries.insert(key.to_string(), value);
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

/// Parser context, one frame per unfinished construct.
#[derive(Debug)]
enum ParseFrame {
    /// Sentinel below the first value; consumed when it arrives.
    Initial,
    /// A string literal is being accumulated. Whether it is a key or a value
    /// is decided by the frame beneath.
    InString { text: String },
    InArray {
        items: LiveArray,
    },
    /// Between object members: the previous member (if any) is finalised and
    /// the next key has not started.
    ExpectingKey {
        prev_key: Option<String>,
        object: LiveObject,
    },
    /// A key has been read and awaits its value.
    ExpectingValue {
        key: String,
        object: LiveObject,
    },
}

impl ParseFrame {
    /// Current snapshot of the frame's container, if it holds one.
    fn container_snapshot(&self) -> Option<Value> {
        match self {
            ParseFrame::InArray { items } => Some(items.to_value()),
            ParseFrame::ExpectingKey { object, .. } | ParseFrame::ExpectingValue { object, .. } => {
                Some(object.to_value())
            }
            ParseFrame::Initial | ParseFrame::InString { .. } => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SnapshotBuilder {
    stack: Vec<ParseFrame>,
    /// The currently published snapshot of the top-level value.
    root: Option<Value>,
    /// Whether the current pump produced meaningful progress.
    progressed: bool,
}

impl SnapshotBuilder {
    pub(crate) fn new() -> Self {
        Self {
            stack: vec![ParseFrame::Initial],
            root: None,
            progressed: false,
        }
    }

    pub(crate) fn begin_pump(&mut self) {
        self.progressed = false;
    }

    pub(crate) fn progressed(&self) -> bool {
        self.progressed
    }

    /// The top-level value has fully parsed.
    pub(crate) fn is_complete(&self) -> bool {
        self.stack.is_empty()
    }

    pub(crate) fn root(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    fn contract_violation(&self, context: &str) -> DecodeError {
        DecodeError::Internal(format!("token arrived in impossible parser state: {context}"))
    }

    /// Installs a completed or freshly opened value into the slot the current
    /// frame designates, advancing object frames past their pending key.
    fn place_value(&mut self, value: Value) -> Result<(), DecodeError> {
        match self.stack.pop() {
            Some(ParseFrame::Initial) => {
                self.root = Some(value);
                Ok(())
            }
            Some(ParseFrame::InArray { mut items }) => {
                items.append(value);
                self.stack.push(ParseFrame::InArray { items });
                self.refresh()
            }
            Some(ParseFrame::ExpectingValue { key, mut object }) => {
                object.set(&key, value);
                self.stack.push(ParseFrame::ExpectingKey {
                    prev_key: Some(key),
                    object,
                });
                self.refresh()
            }
            _ => Err(self.contract_violation("value token with no slot to receive it")),
        }
    }

    fn on_scalar(&mut self, value: Value) -> Result<(), DecodeError> {
        self.progressed = true;
        self.place_value(value)
    }

    fn on_array_start(&mut self) -> Result<(), DecodeError> {
        self.progressed = true;
        self.place_value(Value::Array(Vec::new()))?;
        self.stack.push(ParseFrame::InArray {
            items: LiveArray::default(),
        });
        Ok(())
    }

    fn on_object_start(&mut self) -> Result<(), DecodeError> {
        self.progressed = true;
        self.place_value(Value::Object(Map::new()))?;
        self.stack.push(ParseFrame::ExpectingKey {
            prev_key: None,
            object: LiveObject::default(),
        });
        Ok(())
    }

    fn on_string_start(&mut self) -> Result<(), DecodeError> {
        // In key position the accumulating text stays invisible until its
        // value arrives; in value position an empty string is published
        // immediately so the consumer sees the slot fill in.
        let key_position = matches!(self.stack.last(), Some(ParseFrame::ExpectingKey { .. }));
        if !key_position {
            self.progressed = true;
            self.place_value(Value::String(String::new()))?;
            // The ExpectingValue -> ExpectingKey transition for object
            // members is deferred to StringEnd, so re-open the slot.
            if let Some(ParseFrame::ExpectingKey {
                prev_key: Some(_), ..
            }) = self.stack.last()
            {
                let Some(ParseFrame::ExpectingKey {
                    prev_key: Some(key),
                    object,
                }) = self.stack.pop()
                else {
                    return Err(self.contract_violation("string start lost its object frame"));
                };
                self.stack.push(ParseFrame::ExpectingValue { key, object });
            }
        }
        self.stack.push(ParseFrame::InString {
            text: String::new(),
        });
        Ok(())
    }

    fn on_string_middle(&mut self, chunk: &str) -> Result<(), DecodeError> {
        let text = match self.stack.last_mut() {
            Some(ParseFrame::InString { text }) => {
                text.push_str(chunk);
                text.clone()
            }
            _ => return Err(self.contract_violation("string fragment outside a string")),
        };
        let len = self.stack.len();
        if len == 1 {
            // Top-level string.
            self.progressed = true;
            self.root = Some(Value::String(text));
            return Ok(());
        }
        let update_parent = {
            match &mut self.stack[len - 2] {
                ParseFrame::ExpectingKey { .. } => false,
                ParseFrame::InArray { items } => {
                    items.replace_last(Value::String(text))?;
                    true
                }
                ParseFrame::ExpectingValue { key, object } => {
                    let key = key.clone();
                    object.set(&key, Value::String(text));
                    true
                }
                _ => return Err(self.contract_violation("string fragment under a scalar frame")),
            }
        };
        if update_parent {
            self.progressed = true;
            self.refresh()?;
        }
        Ok(())
    }

    fn on_string_end(&mut self) -> Result<(), DecodeError> {
        let Some(ParseFrame::InString { text }) = self.stack.pop() else {
            return Err(self.contract_violation("string end outside a string"));
        };
        match self.stack.pop() {
            None => {
                self.root = Some(Value::String(text));
                Ok(())
            }
            Some(ParseFrame::InArray { mut items }) => {
                items.replace_last(Value::String(text))?;
                self.stack.push(ParseFrame::InArray { items });
                self.refresh()
            }
            Some(ParseFrame::ExpectingValue { key, mut object }) => {
                object.set(&key, Value::String(text));
                self.stack.push(ParseFrame::ExpectingKey {
                    prev_key: Some(key),
                    object,
                });
                self.refresh()
            }
            // The accumulated text becomes the next member's key.
            Some(ParseFrame::ExpectingKey { object, .. }) => {
                self.stack.push(ParseFrame::ExpectingValue { key: text, object });
                Ok(())
            }
            Some(ParseFrame::Initial) => {
                Err(self.contract_violation("string end above the initial sentinel"))
            }
            Some(ParseFrame::InString { .. }) => {
                Err(self.contract_violation("string end above another open string"))
            }
        }
    }

    fn on_array_end(&mut self) -> Result<(), DecodeError> {
        match self.stack.pop() {
            Some(ParseFrame::InArray { items }) => {
                if self.stack.is_empty() {
                    self.root = Some(items.to_value());
                }
                Ok(())
            }
            _ => Err(self.contract_violation("array end without an open array")),
        }
    }

    fn on_object_end(&mut self) -> Result<(), DecodeError> {
        match self.stack.pop() {
            Some(
                ParseFrame::ExpectingKey { object, .. } | ParseFrame::ExpectingValue { object, .. },
            ) => {
                if self.stack.is_empty() {
                    self.root = Some(object.to_value());
                }
                Ok(())
            }
            _ => Err(self.contract_violation("object end without an open object")),
        }
    }

    /// Propagates container snapshots from the stack tip toward the root and
    /// re-publishes the top-level value.
    ///
    /// A container's slot in its parent is the last element of a parent
    /// array, or the previously finalised key of a parent object.
    fn refresh(&mut self) -> Result<(), DecodeError> {
        for i in (1..self.stack.len()).rev() {
            let Some(snapshot) = self.stack[i].container_snapshot() else {
                continue;
            };
            match &mut self.stack[i - 1] {
                ParseFrame::InArray { items } => items.replace_last(snapshot)?,
                ParseFrame::ExpectingKey {
                    prev_key: Some(key),
                    object,
                } => {
                    let key = key.clone();
                    object.set(&key, snapshot);
                }
                _ => {
                    return Err(
                        self.contract_violation("container frame with no slot in its parent")
                    )
                }
            }
        }
        let root_snapshot = self.stack.first().and_then(|frame| match frame {
            ParseFrame::InString { text } => Some(Value::String(text.clone())),
            other => other.container_snapshot(),
        });
        if let Some(value) = root_snapshot {
            self.root = Some(value);
        }
        Ok(())
    }
}

impl TokenSink for SnapshotBuilder {
    fn token(&mut self, token: Token) -> Result<(), DecodeError> {
        match token {
            Token::Null => self.on_scalar(Value::Null),
            Token::Boolean(b) => self.on_scalar(Value::Boolean(b)),
            Token::Number(n) => self.on_scalar(Value::Number(n)),
            Token::StringStart => self.on_string_start(),
            Token::StringMiddle(chunk) => self.on_string_middle(&chunk),
            Token::StringEnd => self.on_string_end(),
            Token::ArrayStart => self.on_array_start(),
            Token::ArrayEnd => self.on_array_end(),
            Token::ObjectStart => self.on_object_start(),
            Token::ObjectEnd => self.on_object_end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotBuilder;
    use crate::{
        token::{Token, TokenSink},
        value::Value,
    };

    fn feed(builder: &mut SnapshotBuilder, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            builder.token(token).unwrap();
        }
    }

    fn json(text: &str) -> Value {
        let decoded: Vec<_> = crate::StreamingDecoder::from_text(text, Default::default())
            .collect::<Result<_, _>>()
            .unwrap();
        decoded.last().unwrap().clone()
    }

    #[test]
    fn key_accumulation_is_not_progress() {
        let mut builder = SnapshotBuilder::new();
        builder.begin_pump();
        feed(&mut builder, [Token::ObjectStart]);
        assert!(builder.progressed());

        builder.begin_pump();
        feed(
            &mut builder,
            [
                Token::StringStart,
                Token::StringMiddle("na".to_string()),
                Token::StringMiddle("me".to_string()),
            ],
        );
        assert!(!builder.progressed());
        // the in-progress key must not leak into the snapshot
        assert_eq!(builder.root(), Some(&json("{}")));

        builder.begin_pump();
        feed(&mut builder, [Token::StringEnd, Token::Null]);
        assert!(builder.progressed());
        assert_eq!(builder.root(), Some(&json(r#"{"name": null}"#)));
    }

    #[test]
    fn value_string_grows_in_place() {
        let mut builder = SnapshotBuilder::new();
        feed(
            &mut builder,
            [
                Token::ArrayStart,
                Token::StringStart,
                Token::StringMiddle("he".to_string()),
            ],
        );
        assert_eq!(builder.root(), Some(&json(r#"["he"]"#)));
        feed(&mut builder, [Token::StringMiddle("llo".to_string()), Token::StringEnd]);
        assert_eq!(builder.root(), Some(&json(r#"["hello"]"#)));
    }

    #[test]
    fn nested_mutations_reach_the_root() {
        let mut builder = SnapshotBuilder::new();
        feed(
            &mut builder,
            [
                Token::ObjectStart,
                Token::StringStart,
                Token::StringMiddle("a".to_string()),
                Token::StringEnd,
                Token::ArrayStart,
                Token::ObjectStart,
                Token::StringStart,
                Token::StringMiddle("b".to_string()),
                Token::StringEnd,
                Token::Number(1.0),
            ],
        );
        assert_eq!(builder.root(), Some(&json(r#"{"a": [{"b": 1}]}"#)));
        feed(&mut builder, [Token::ObjectEnd, Token::ArrayEnd, Token::ObjectEnd]);
        assert!(builder.is_complete());
        assert_eq!(builder.root(), Some(&json(r#"{"a": [{"b": 1}]}"#)));
    }

    #[test]
    fn duplicate_keys_overwrite_in_place() {
        let mut builder = SnapshotBuilder::new();
        feed(
            &mut builder,
            [
                Token::ObjectStart,
                Token::StringStart,
                Token::StringMiddle("k".to_string()),
                Token::StringEnd,
                Token::Number(1.0),
                Token::StringStart,
                Token::StringMiddle("other".to_string()),
                Token::StringEnd,
                Token::Number(2.0),
                Token::StringStart,
                Token::StringMiddle("k".to_string()),
                Token::StringEnd,
                Token::Number(3.0),
                Token::ObjectEnd,
            ],
        );
        let root = builder.root().unwrap();
        assert_eq!(root, &json(r#"{"k": 3, "other": 2}"#));
        // first-insertion order: "k" stays first
        let keys: Vec<_> = root.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["k", "other"]);
    }

    #[test]
    fn impossible_states_are_internal_errors() {
        let mut builder = SnapshotBuilder::new();
        assert!(matches!(
            builder.token(Token::ArrayEnd),
            Err(crate::DecodeError::Internal(_))
        ));
    }
}
