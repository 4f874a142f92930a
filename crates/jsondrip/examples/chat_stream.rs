//! Renders a streamed LLM tool-call response as it arrives.
//!
//! The assistant replies with a JSON object whose `moderation` field comes
//! first, so a backend can abort before the expensive part of the payload has
//! even finished transmitting. The `reply.content` string is rendered
//! incrementally, the way a chat UI would paint tokens.
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsondrip --example chat_stream
//! ```

use jsondrip::{DecodeOptions, StreamingDecoder};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ToolCall {
    moderation: Option<Moderation>,
    reply: Option<Reply>,
    done: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Moderation {
    decision: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    content: Option<String>,
}

fn main() {
    // A toy assistant response delivered in small, irregular chunks, the way
    // chat-completion APIs hand out partial tokens. In real life this would
    // come from the network.
    let simulated_stream: [&str; 9] = [
        r#"{"moderation":{"decision":"al"#,
        r#"lo"#,
        r#"w"},"reply":{"content":"Str"#,
        r#"eaming JSON lets a UI re"#,
        r#"nder partial values as the"#,
        r#"y arrive."#,
        r#""}"#,
        r#","done":tru"#,
        r#"e}"#,
    ];

    let decoder = StreamingDecoder::new(simulated_stream.into_iter(), DecodeOptions::default())
        .typed::<ToolCall>();

    let mut printed = 0;
    for snapshot in decoder {
        let call = match snapshot {
            Ok(call) => call,
            // Early snapshots may not satisfy the schema yet; keep pulling.
            Err(jsondrip::TypedDecodeError::Schema(_)) => continue,
            Err(err) => {
                eprintln!("stream failed: {err}");
                return;
            }
        };

        if let Some(decision) = call.moderation.as_ref().and_then(|m| m.decision.as_deref()) {
            if decision.starts_with("block") {
                eprintln!("moderation blocked the content - aborting");
                return;
            }
        }

        if let Some(content) = call.reply.as_ref().and_then(|r| r.content.as_deref()) {
            // Print only what is new since the previous snapshot.
            print!("{}", &content[printed..]);
            printed = content.len();
        }

        if call.done == Some(true) {
            println!();
            println!("(complete)");
            break;
        }
    }
}
