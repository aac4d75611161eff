//! Turning a webhook response body into the text shown to the user.
//!
//! The body is read as text, classified once into a [`ParsedBody`], and then
//! offered to an ordered list of extractors. The first extractor that
//! recognises the shape wins; the last one accepts anything, so extraction
//! never fails. A body that is not JSON is not an error, it is simply
//! returned unchanged.

use serde_json::Value;

pub const EMPTY_REPLY_PLACEHOLDER: &str = "Webhook responded but returned no data";

/// Object fields tried in order when the reply is a JSON object.
pub const OBJECT_REPLY_FIELDS: &[&str] = &["message", "response", "text", "output"];

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// Empty or whitespace only.
    Blank,
    Json(Value),
    /// JSON parsing failed; the raw text is the reply.
    NotJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    Placeholder,
    /// `[{"text": ...}, ...]`, as n8n's "Respond to Webhook" node emits.
    ArrayText,
    ObjectField(&'static str),
    /// Object or array without a recognised field, re-serialized.
    Serialized,
    /// Not JSON, or a JSON scalar; the body exactly as received.
    RawText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub shape: ReplyShape,
}

impl Reply {
    fn new(text: impl Into<String>, shape: ReplyShape) -> Self {
        Self {
            text: text.into(),
            shape,
        }
    }
}

struct Body<'a> {
    raw: &'a str,
    parsed: ParsedBody,
}

type Extractor = fn(&Body<'_>) -> Option<Reply>;

const EXTRACTORS: &[Extractor] = &[
    blank_body,
    first_array_text,
    object_field,
    serialized_structure,
    raw_text,
];

pub fn parse_body(raw: &str) -> ParsedBody {
    if raw.trim().is_empty() {
        return ParsedBody::Blank;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => ParsedBody::Json(value),
        Err(_) => ParsedBody::NotJson,
    }
}

pub fn extract_reply(raw: &str) -> Reply {
    let body = Body {
        raw,
        parsed: parse_body(raw),
    };
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(&body))
        .unwrap_or_else(|| Reply::new(raw, ReplyShape::RawText))
}

/// Convenience wrapper returning only the reply text.
pub fn parse_reply(raw: &str) -> String {
    extract_reply(raw).text
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn blank_body(body: &Body<'_>) -> Option<Reply> {
    matches!(body.parsed, ParsedBody::Blank)
        .then(|| Reply::new(EMPTY_REPLY_PLACEHOLDER, ReplyShape::Placeholder))
}

fn first_array_text(body: &Body<'_>) -> Option<Reply> {
    let ParsedBody::Json(Value::Array(items)) = &body.parsed else {
        return None;
    };
    non_empty_str(items.first().and_then(|item| item.get("text")))
        .map(|text| Reply::new(text, ReplyShape::ArrayText))
}

fn object_field(body: &Body<'_>) -> Option<Reply> {
    let ParsedBody::Json(Value::Object(map)) = &body.parsed else {
        return None;
    };
    OBJECT_REPLY_FIELDS.iter().find_map(|field| {
        non_empty_str(map.get(*field))
            .map(|text| Reply::new(text, ReplyShape::ObjectField(*field)))
    })
}

fn serialized_structure(body: &Body<'_>) -> Option<Reply> {
    match &body.parsed {
        ParsedBody::Json(value @ (Value::Object(_) | Value::Array(_))) => {
            Some(Reply::new(value.to_string(), ReplyShape::Serialized))
        }
        _ => None,
    }
}

fn raw_text(body: &Body<'_>) -> Option<Reply> {
    Some(Reply::new(body.raw, ReplyShape::RawText))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_bodies_get_placeholder() {
        for raw in ["", "   ", "\n\t "] {
            let reply = extract_reply(raw);
            assert_eq!(reply.text, EMPTY_REPLY_PLACEHOLDER);
            assert_eq!(reply.shape, ReplyShape::Placeholder);
        }
    }

    #[test]
    fn array_first_element_text_wins() {
        let reply = extract_reply(r#"[{"text":"ok"},{"text":"second"}]"#);
        assert_eq!(reply, Reply::new("ok", ReplyShape::ArrayText));
    }

    #[test]
    fn array_without_text_is_serialized() {
        let reply = extract_reply(r#"[{"output":"x"}]"#);
        assert_eq!(reply.shape, ReplyShape::Serialized);
        assert_eq!(reply.text, r#"[{"output":"x"}]"#);

        assert_eq!(extract_reply("[]").text, "[]");
    }

    #[test]
    fn object_fields_follow_precedence() {
        let raw =
            json!({"output": "o", "text": "t", "response": "r", "message": "m"}).to_string();
        assert_eq!(
            extract_reply(&raw),
            Reply::new("m", ReplyShape::ObjectField("message"))
        );

        let raw = json!({"output": "o", "text": "t"}).to_string();
        assert_eq!(
            extract_reply(&raw),
            Reply::new("t", ReplyShape::ObjectField("text"))
        );

        let raw = json!({"output": "only output"}).to_string();
        assert_eq!(parse_reply(&raw), "only output");
    }

    #[test]
    fn empty_or_non_string_fields_are_skipped() {
        let raw = json!({"message": "", "response": 42, "output": "fallback"}).to_string();
        assert_eq!(parse_reply(&raw), "fallback");
    }

    #[test]
    fn unrecognised_object_is_stringified() {
        let raw = r#"{"status":"done"}"#;
        let reply = extract_reply(raw);
        assert_eq!(reply.shape, ReplyShape::Serialized);
        assert_eq!(reply.text, r#"{"status":"done"}"#);
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        for raw in ["Hello, Neo.", "  padded text  ", "{not json", "<p>html</p>"] {
            assert_eq!(parse_reply(raw), raw);
            // Idempotent on its own output.
            assert_eq!(parse_reply(&parse_reply(raw)), raw);
        }
    }

    #[test]
    fn json_scalars_are_returned_raw() {
        assert_eq!(
            extract_reply(r#""quoted""#),
            Reply::new(r#""quoted""#, ReplyShape::RawText)
        );
        assert_eq!(extract_reply("true"), Reply::new("true", ReplyShape::RawText));
        assert_eq!(extract_reply("42"), Reply::new("42", ReplyShape::RawText));
        assert_eq!(extract_reply("null"), Reply::new("null", ReplyShape::RawText));
    }

    #[test]
    fn serialized_shapes_round_trip() {
        assert_eq!(parse_reply(&json!({"message": "x"}).to_string()), "x");
        assert_eq!(parse_reply(&json!([{"text": "y"}]).to_string()), "y");
    }
}
