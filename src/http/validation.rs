use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;
use tracing::debug;

use crate::error::DispatchError;
use crate::store::FilterValue;

/// Request body as JSON, or `null` when it is missing or malformed so that
/// each endpoint applies its own policy to absent fields.
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Value {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Request body is not JSON; treating as empty");
            Value::Null
        }
    }
}

/// Truthiness of a JSON value as the mobile clients understand it: `null`,
/// `false`, `0`, `""` and absent fields are falsy, everything else
/// (including empty arrays and objects) is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub fn missing_fields(body: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| !is_truthy(body.get(**field)))
        .map(|field| field.to_string())
        .collect()
}

/// Who a multicast request is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    Tokens(Vec<String>),
    Role(FilterValue),
}

impl Recipients {
    /// Reads `tokens`, falling back to `role`; `None` when both are falsy.
    pub fn from_body(body: &Value) -> Option<Self> {
        if let Some(tokens) = body.get("tokens").filter(|value| is_truthy(Some(value))) {
            return Some(Self::Tokens(token_list(tokens)));
        }
        body.get("role")
            .filter(|value| is_truthy(Some(value)))
            .map(|role| Self::Role(filter_value(role)))
    }
}

/// Validates a multicast request: `title`, `body` and a recipient field must
/// all be truthy.
pub fn parse_multicast(body: &Value) -> Result<(String, String, Recipients), DispatchError> {
    let mut missing = missing_fields(body, &["title", "body"]);
    let recipients = Recipients::from_body(body);
    if recipients.is_none() {
        missing.push("tokens|role".to_string());
    }
    match recipients {
        Some(recipients) if missing.is_empty() => Ok((
            text_field(body, "title"),
            text_field(body, "body"),
            recipients,
        )),
        _ => Err(DispatchError::MissingFields { fields: missing }),
    }
}

/// String form of a field, empty when absent or null.
pub fn text_field(body: &Value, field: &str) -> String {
    match body.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Non-blank token strings of a `tokens` field; a bare string counts as one
/// token.
pub fn token_list(value: &Value) -> Vec<String> {
    let candidates: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single @ Value::String(_) => vec![single],
        _ => Vec::new(),
    };
    candidates
        .into_iter()
        .filter_map(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn filter_value(value: &Value) -> FilterValue {
    match value {
        Value::Number(number) => number
            .as_i64()
            .map(FilterValue::Number)
            .unwrap_or_else(|| FilterValue::Text(number.to_string())),
        Value::String(text) => FilterValue::Text(text.clone()),
        other => FilterValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_client_rules() {
        let body = json!({
            "null": null, "no": false, "zero": 0, "empty": "",
            "yes": true, "one": 1, "text": "x", "list": [], "obj": {}
        });
        for falsy in ["null", "no", "zero", "empty", "absent"] {
            assert!(!is_truthy(body.get(falsy)), "{falsy} should be falsy");
        }
        for truthy in ["yes", "one", "text", "list", "obj"] {
            assert!(is_truthy(body.get(truthy)), "{truthy} should be truthy");
        }
    }

    #[test]
    fn multicast_reports_all_missing_fields() {
        let body = json!({"title": "Hi", "body": ""});
        match parse_multicast(&body) {
            Err(DispatchError::MissingFields { fields }) => {
                assert_eq!(fields, vec!["body".to_string(), "tokens|role".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn tokens_take_precedence_over_role() {
        let body = json!({"title": "a", "body": "b", "tokens": ["t1"], "role": "mozo"});
        let (_, _, recipients) = parse_multicast(&body).unwrap();
        assert_eq!(recipients, Recipients::Tokens(vec!["t1".to_string()]));

        let body = json!({"title": "a", "body": "b", "tokens": "", "role": "mozo"});
        let (title, text, recipients) = parse_multicast(&body).unwrap();
        assert_eq!((title.as_str(), text.as_str()), ("a", "b"));
        assert_eq!(recipients, Recipients::Role(FilterValue::Text("mozo".to_string())));
    }

    #[test]
    fn empty_token_array_still_counts_as_recipient_field() {
        let body = json!({"title": "a", "body": "b", "tokens": []});
        let (_, _, recipients) = parse_multicast(&body).unwrap();
        assert_eq!(recipients, Recipients::Tokens(Vec::new()));
    }

    #[test]
    fn null_body_misses_everything() {
        assert_eq!(
            missing_fields(&Value::Null, &["title", "body"]),
            vec!["title".to_string(), "body".to_string()]
        );
    }

    #[test]
    fn token_list_drops_blank_and_non_string_entries() {
        let tokens = token_list(&json!(["a", "", "  ", null, 5, "b"]));
        assert_eq!(tokens, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(token_list(&json!("solo")), vec!["solo".to_string()]);
        assert!(token_list(&json!({"a": 1})).is_empty());
    }

    #[test]
    fn text_field_stringifies_scalars() {
        let body = json!({"token": "abc", "title": 7, "body": null});
        assert_eq!(text_field(&body, "token"), "abc");
        assert_eq!(text_field(&body, "title"), "7");
        assert_eq!(text_field(&body, "body"), "");
        assert_eq!(text_field(&body, "missing"), "");
    }

    #[test]
    fn filter_value_keeps_numbers() {
        assert_eq!(filter_value(&json!(3)), FilterValue::Number(3));
        assert_eq!(filter_value(&json!("mozo")), FilterValue::Text("mozo".to_string()));
    }
}
