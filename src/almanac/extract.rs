use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::gemini::client::GenerationReply;

/// Return the candidate JSON region of a free-text model reply.
///
/// Prefers the first triple-backtick fence tagged `json`, then the first
/// bare fence (skipping any language tag on the opening line), and falls
/// back to the whole text when no fence closes. No knowledge of the target
/// schema; shape validation is the caller's job.
pub fn fenced_candidate(text: &str) -> &str {
    if let Some(open) = text.find("```json") {
        let body_start = open + "```json".len();
        if let Some(end) = text[body_start..].find("```") {
            return text[body_start..body_start + end].trim();
        }
    }

    if let Some(open) = text.find("```") {
        let after = open + 3;
        let body_start = text[after..]
            .find('\n')
            .map(|n| after + n + 1)
            .unwrap_or(after);
        if let Some(end) = text[body_start..].find("```") {
            return text[body_start..body_start + end].trim();
        }
    }

    text.trim()
}

/// Parse a model reply into JSON. Schema-constrained replies are parsed
/// as-is; free-text replies go through fence extraction first. A parse
/// failure is terminal for the request.
pub fn parse_reply(reply: &GenerationReply) -> Result<Value> {
    let candidate = if reply.schema_constrained {
        reply.text.trim()
    } else {
        fenced_candidate(&reply.text)
    };
    serde_json::from_str(candidate).map_err(|_| FetchError::parse(candidate))
}

pub(crate) fn require_text(value: &Value, field: &str) -> Result<String> {
    let text = value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_field(field))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FetchError::Validation(format!("field `{field}` is empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn missing_field(field: &str) -> FetchError {
    FetchError::Validation(format!("response is missing required field `{field}`"))
}

#[cfg(test)]
mod tests {
    use super::{fenced_candidate, parse_reply, require_text};
    use crate::error::FetchError;
    use crate::gemini::client::GenerationReply;
    use serde_json::json;

    fn free_text(text: &str) -> GenerationReply {
        GenerationReply {
            text: text.to_string(),
            schema_constrained: false,
        }
    }

    #[test]
    fn tagged_fence_wins_over_surrounding_prose() {
        let reply = free_text("Here you go:\n```json\n{\"lat\":40.7,\"lng\":-73.8}\n```");
        let value = parse_reply(&reply).expect("fenced JSON should parse");
        assert_eq!(value, json!({"lat": 40.7, "lng": -73.8}));
    }

    #[test]
    fn bare_fence_skips_the_language_tag_line() {
        let got = fenced_candidate("```\n{\"a\": 1}\n```\ntrailing prose");
        assert_eq!(got, "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_is_the_candidate() {
        let reply = free_text("  {\"phase\": \"Full Moon\"}  ");
        let value = parse_reply(&reply).expect("raw JSON should parse");
        assert_eq!(value["phase"], "Full Moon");
    }

    #[test]
    fn unterminated_fence_falls_back_to_whole_text() {
        assert_eq!(fenced_candidate("```json {\"a\": 1}"), "```json {\"a\": 1}");
    }

    #[test]
    fn schema_constrained_replies_skip_fence_extraction() {
        let reply = GenerationReply {
            text: "{\"a\": 1}".to_string(),
            schema_constrained: true,
        };
        assert_eq!(parse_reply(&reply).expect("parse")["a"], 1);
    }

    #[test]
    fn garbage_raises_a_parse_error_with_the_candidate() {
        let err = parse_reply(&free_text("the moon is nice today")).unwrap_err();
        match err {
            FetchError::Parse { snippet } => assert!(snippet.contains("moon is nice")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn require_text_rejects_missing_and_blank_fields() {
        let value = json!({"phase": "  ", "moonrise": "06:41 AM"});
        assert_eq!(
            require_text(&value, "moonrise").expect("present"),
            "06:41 AM"
        );
        assert!(require_text(&value, "phase").is_err());
        assert!(require_text(&value, "moonset").is_err());
    }
}
