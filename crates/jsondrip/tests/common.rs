#![allow(dead_code)]

//! Shared fixture: a structured tool-call response streamed in chunks that
//! are deliberately cut on transition seams (mid-keyword, mid-key, between a
//! container close and the following key, inside escape sequences).

pub const ORIGINAL: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null
    },
    "reply": {
        "role": "assistant",
        "content": "Sure - here is a haiku about parsers."
    },
    "citations": [
        {
            "title": "RFC 8259",
            "score": 0.92
        },
        {
            "title": "Streaming JSON",
            "score": 0.4
        }
    ],
    "tags": [
        "poetry",
        "json"
    ],
    "usage": {
        "prompt_tokens": 12,
        "completion_tokens": 34
    },
    "done": true
}"#;

#[rustfmt::skip]
pub const STREAM: [&str; 18] = [
    r#"{"moderation":{"decision":"al"#,                  // cut inside the string "allow"
    r#"low","reason":nu"#,                               // cut inside the keyword null
    r#"ll},"rep"#,                                       // object end -> cut inside the next key
    r#"ly":{"role":"assistant","#,                       // string -> string seam
    r#""content":"Sure - here is a haiku "#,             // long value string begins
    r#"about parsers."},"#,                              // string end + object end
    r#""citations":[{"ti"#,                              // array of objects, cut inside a key
    r#"tle":"RFC 8259","score":0.9"#,                    // cut inside a fraction
    r#"2},{"title":"Streaming JSON","#,                  // object -> object seam
    r#""score":0.4}"#,
    r#"],"#,                                             // array end -> next key
    r#""tags":["poe"#,                                   // cut inside an array string
    r#"try","json"],"#,
    r#""usage":{"prompt_tokens":1"#,                     // cut inside an integer
    r#"2,"completion_tokens":34},"#,
    r#""done":tr"#,                                      // cut inside the keyword true
    r#"ue"#,
    r#"}"#,
];

#[test]
fn stream_joins_to_the_original_document() {
    let joined = STREAM.concat();
    let original: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    let streamed: serde_json::Value = serde_json::from_str(&joined).unwrap();
    assert_eq!(original, streamed);
}
