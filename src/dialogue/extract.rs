//! Tolerant reply extraction from the endpoint's loosely specified payloads.
//!
//! Known shapes, tried in order:
//! 1. `{"output": "..."}`
//! 2. `"..."`
//! 3. `[{"content": "..."}, ...]`
//! 4. `["...", ...]`
//! 5. `{"response": "..."}`

use super::DialogueError;
use serde_json::Value;

/// Reason a parsed payload counts as degraded, if it does.
pub fn degraded_reason(payload: &Value) -> Option<&'static str> {
    match payload {
        Value::Null => Some("null payload"),
        Value::Array(items) if items.is_empty() => Some("empty list"),
        Value::String(s) if s.is_empty() => Some("empty string"),
        _ => None,
    }
}

/// Decode a success body into reply text.
///
/// Empty, null, empty-list or non-JSON bodies are [`DialogueError::Degraded`]
/// (retryable); anything else without a known shape is
/// [`DialogueError::Unparseable`].
pub fn interpret_body(body: &str) -> Result<String, DialogueError> {
    if body.trim().is_empty() {
        return Err(DialogueError::Degraded("empty body"));
    }
    let payload: Value =
        serde_json::from_str(body).map_err(|_| DialogueError::Degraded("body is not valid JSON"))?;
    if let Some(reason) = degraded_reason(&payload) {
        return Err(DialogueError::Degraded(reason));
    }
    extract_reply(&payload).ok_or(DialogueError::Unparseable)
}

/// Pull reply text out of a payload. `None` when no known shape matches.
pub fn extract_reply(payload: &Value) -> Option<String> {
    non_empty_str(payload.get("output"))
        .or_else(|| payload.as_str().filter(|s| !s.is_empty()))
        .or_else(|| {
            let first = payload.as_array()?.first()?;
            non_empty_str(first.get("content"))
                .or_else(|| first.as_str().filter(|s| !s.is_empty()))
        })
        .or_else(|| non_empty_str(payload.get("response")))
        .map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_field_wins() {
        let payload = json!({"output": "from output", "response": "from response"});
        assert_eq!(extract_reply(&payload).as_deref(), Some("from output"));
    }

    #[test]
    fn bare_string_payload() {
        assert_eq!(extract_reply(&json!("plain")).as_deref(), Some("plain"));
    }

    #[test]
    fn first_list_element_content() {
        let payload = json!([{"content": "first"}, {"content": "second"}]);
        assert_eq!(extract_reply(&payload).as_deref(), Some("first"));
    }

    #[test]
    fn first_list_element_string() {
        assert_eq!(extract_reply(&json!(["a", "b"])).as_deref(), Some("a"));
    }

    #[test]
    fn response_field_is_last_resort() {
        assert_eq!(
            extract_reply(&json!({"response": "late"})).as_deref(),
            Some("late")
        );
        assert_eq!(
            extract_reply(&json!({"output": "", "response": "late"})).as_deref(),
            Some("late")
        );
    }

    #[test]
    fn unknown_shapes_yield_none() {
        assert!(extract_reply(&json!({})).is_none());
        assert!(extract_reply(&json!({"output": 42})).is_none());
        assert!(extract_reply(&json!([{"text": "x"}])).is_none());
        assert!(extract_reply(&json!(17)).is_none());
    }

    #[test]
    fn degraded_bodies_are_retryable() {
        for body in ["", "   ", "null", "[]", "\"\"", "<html>oops</html>"] {
            let err = interpret_body(body).unwrap_err();
            assert!(matches!(err, DialogueError::Degraded(_)), "{body:?} -> {err:?}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn empty_object_is_unparseable_not_degraded() {
        assert_eq!(interpret_body("{}").unwrap_err(), DialogueError::Unparseable);
    }

    #[test]
    fn interpret_success() {
        assert_eq!(interpret_body(r#"{"output":"X"}"#).unwrap(), "X");
    }
}
