use lesson_progress_shared::models::{LessonProgress, RecordProgress, TelegramProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

pub const TELEGRAM_ID_REQUIRED: &str = "telegram_id required";
pub const FIELDS_REQUIRED: &str = "telegram_id and lesson_id required";
pub const TELEGRAM_ID_NOT_INTEGER: &str = "telegram_id must be an integer";

// Request DTOs
#[derive(Deserialize, Debug, Default)]
pub struct ProgressQuery {
    pub telegram_id: Option<String>,
}

impl ProgressQuery {
    pub fn telegram_id(&self) -> Result<i64> {
        match self.telegram_id.as_deref().map(str::trim) {
            None | Some("") => Err(AppError::bad_request(TELEGRAM_ID_REQUIRED)),
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::bad_request(TELEGRAM_ID_NOT_INTEGER)),
        }
    }
}

/// Body of a POST. `telegram_id` arrives as a number or a numeric string
/// depending on the client, so it is kept raw until validation.
#[derive(Deserialize, Debug, Default)]
pub struct RecordProgressRequest {
    #[serde(default)]
    pub telegram_id: Option<Value>,
    #[serde(default)]
    pub telegram_user: Option<TelegramProfile>,
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl RecordProgressRequest {
    /// An empty body reads as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// Validates the body into a command. Missing, null, zero and empty
    /// values all count as absent for the two required fields.
    pub fn into_command(self) -> Result<RecordProgress> {
        let lesson_id = self.lesson_id.filter(|id| !id.is_empty());

        let (telegram_id, lesson_id) = match (self.telegram_id, lesson_id) {
            (Some(telegram_id), Some(lesson_id)) if !is_falsy(&telegram_id) => {
                (telegram_id, lesson_id)
            }
            _ => return Err(AppError::bad_request(FIELDS_REQUIRED)),
        };

        Ok(RecordProgress {
            telegram_id: telegram_id_from_json(&telegram_id)?,
            lesson_id,
            is_completed: self.is_completed.unwrap_or(false),
            profile: self.telegram_user.unwrap_or_default(),
        })
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn telegram_id_from_json(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AppError::bad_request(TELEGRAM_ID_NOT_INTEGER))
}

// Response DTOs
#[derive(Serialize, Debug)]
pub struct ProgressEntry {
    pub lesson_id: String,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

impl From<LessonProgress> for ProgressEntry {
    fn from(row: LessonProgress) -> Self {
        Self {
            completed_at: row.completed_at_iso(),
            lesson_id: row.lesson_id,
            is_completed: row.is_completed,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ProgressListResponse {
    pub progress: Vec<ProgressEntry>,
}

impl From<Vec<LessonProgress>> for ProgressListResponse {
    fn from(rows: Vec<LessonProgress>) -> Self {
        Self {
            progress: rows.into_iter().map(ProgressEntry::from).collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RecordProgressResponse {
    pub success: bool,
    pub lesson_id: String,
    pub is_completed: bool,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<RecordProgress> {
        RecordProgressRequest::from_body(body.to_string().as_bytes())?.into_command()
    }

    fn error_message(result: Result<RecordProgress>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_numeric_and_string_telegram_ids() {
        let from_number = parse(json!({"telegram_id": 123, "lesson_id": "l1"})).unwrap();
        let from_string = parse(json!({"telegram_id": "123", "lesson_id": "l1"})).unwrap();

        assert_eq!(from_number.telegram_id, 123);
        assert_eq!(from_string.telegram_id, 123);
        assert!(!from_number.is_completed);
        assert_eq!(from_number.profile, TelegramProfile::default());
    }

    #[test]
    fn test_falsy_required_fields_are_rejected() {
        for body in [
            json!({"lesson_id": "l1"}),
            json!({"telegram_id": 0, "lesson_id": "l1"}),
            json!({"telegram_id": "", "lesson_id": "l1"}),
            json!({"telegram_id": null, "lesson_id": "l1"}),
            json!({"telegram_id": 5}),
            json!({"telegram_id": 5, "lesson_id": ""}),
            json!({"telegram_id": 5, "lesson_id": null}),
        ] {
            assert_eq!(error_message(parse(body)), FIELDS_REQUIRED);
        }
    }

    #[test]
    fn test_non_integer_telegram_id_is_rejected() {
        assert_eq!(
            error_message(parse(json!({"telegram_id": "abc", "lesson_id": "l1"}))),
            TELEGRAM_ID_NOT_INTEGER
        );
        assert_eq!(
            error_message(parse(json!({"telegram_id": 1.5, "lesson_id": "l1"}))),
            TELEGRAM_ID_NOT_INTEGER
        );
    }

    #[test]
    fn test_empty_body_reads_as_missing_fields() {
        let result = RecordProgressRequest::from_body(b"")
            .unwrap()
            .into_command();
        assert_eq!(error_message(result), FIELDS_REQUIRED);
    }

    #[test]
    fn test_malformed_body_is_a_serialization_error() {
        let result = RecordProgressRequest::from_body(b"{not json");
        assert!(matches!(result, Err(AppError::SerializationError(_))));
    }

    #[test]
    fn test_null_profile_fields_are_tolerated() {
        let command = parse(json!({
            "telegram_id": 9,
            "lesson_id": "l1",
            "is_completed": true,
            "telegram_user": {"first_name": "Ann", "last_name": null}
        }))
        .unwrap();

        assert!(command.is_completed);
        assert_eq!(command.profile.first_name.as_deref(), Some("Ann"));
        assert_eq!(command.profile.last_name, None);
        assert_eq!(command.new_user().last_name, "");
    }

    #[test]
    fn test_query_telegram_id() {
        let missing = ProgressQuery::default();
        assert!(matches!(
            missing.telegram_id(),
            Err(AppError::BadRequest(m)) if m == TELEGRAM_ID_REQUIRED
        ));

        let bad = ProgressQuery {
            telegram_id: Some("12x".into()),
        };
        assert!(matches!(
            bad.telegram_id(),
            Err(AppError::BadRequest(m)) if m == TELEGRAM_ID_NOT_INTEGER
        ));

        let good = ProgressQuery {
            telegram_id: Some("42".into()),
        };
        assert_eq!(good.telegram_id().unwrap(), 42);
    }
}
