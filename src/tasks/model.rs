// tasks/model.rs — Task entity and request-input parsing.
//
// Inputs arrive as untyped JSON and are parsed into typed structs before
// any storage call. Parsing is pure: no side effects, no storage access.
// A parse failure carries field-level context so the HTTP layer can return
// a descriptive 400 message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A to-do item — the sole domain entity.
///
/// Wire names are camelCase; SQLite columns are snake_case and match the
/// Rust field names directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier (UUID v4), assigned at creation, immutable.
    pub id: String,
    /// Never empty or whitespace-only.
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO 8601 calendar date string; format not enforced beyond string type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub completed: bool,
    /// RFC 3339 timestamp, set once at creation.
    pub created_at: String,
    /// RFC 3339 timestamp, refreshed on every mutation.
    pub updated_at: String,
}

/// Parsed body of `POST /tasks`. Fields are stored as received; the
/// service trims `title` and `description` before persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// Parsed body of `PATCH /tasks/{id}`. `Some` means the field was present
/// in the request and should be written; `None` means leave it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Title is required and must be a non-empty string")]
    MissingTitle,
    #[error("Field '{0}' must be a non-empty string")]
    EmptyString(&'static str),
    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),
    #[error("Field '{0}' must be a boolean")]
    NotABoolean(&'static str),
    #[error("Provide at least one field to update (title, description, dueDate, or completed)")]
    NoFieldsToUpdate,
}

/// Read an optional string field. Explicit JSON `null` counts as present
/// and wrongly typed, so it is rejected like any other non-string.
fn optional_string(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match obj.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

impl CreateTaskInput {
    /// Parse an untyped create payload.
    ///
    /// `title` is required and must be non-empty after trimming;
    /// `description` and `dueDate` are optional strings. Unknown fields
    /// are ignored.
    pub fn parse(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let title = match obj.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => return Err(ValidationError::EmptyString("title")),
            Some(_) => return Err(ValidationError::NotAString("title")),
            None => return Err(ValidationError::MissingTitle),
        };

        Ok(Self {
            title,
            description: optional_string(obj, "description")?,
            due_date: optional_string(obj, "dueDate")?,
        })
    }
}

impl UpdateTaskInput {
    /// Parse an untyped update payload.
    ///
    /// At least one of `title`, `description`, `dueDate`, `completed` must
    /// be present (key presence, not truthiness). Each present field must
    /// have the right type; `title` must additionally be non-empty after
    /// trimming. Unknown fields are ignored.
    pub fn parse(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let title = match obj.get("title") {
            None => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::String(_)) => return Err(ValidationError::EmptyString("title")),
            Some(_) => return Err(ValidationError::NotAString("title")),
        };

        let completed = match obj.get("completed") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => return Err(ValidationError::NotABoolean("completed")),
        };

        let input = Self {
            title,
            description: optional_string(obj, "description")?,
            due_date: optional_string(obj, "dueDate")?,
            completed,
        };

        if input == Self::default() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Create ──────────────────────────────────────────────────────────

    #[test]
    fn create_accepts_title_only() {
        let input = CreateTaskInput::parse(&json!({"title": "Buy milk"})).unwrap();
        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.description, None);
        assert_eq!(input.due_date, None);
    }

    #[test]
    fn create_accepts_all_fields() {
        let input = CreateTaskInput::parse(&json!({
            "title": "Buy milk",
            "description": "2 liters",
            "dueDate": "2026-09-01"
        }))
        .unwrap();
        assert_eq!(input.description.as_deref(), Some("2 liters"));
        assert_eq!(input.due_date.as_deref(), Some("2026-09-01"));
    }

    #[test]
    fn create_rejects_missing_title() {
        assert_eq!(
            CreateTaskInput::parse(&json!({"description": "x"})),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn create_rejects_empty_and_whitespace_title() {
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": ""})),
            Err(ValidationError::EmptyString("title"))
        );
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": "   "})),
            Err(ValidationError::EmptyString("title"))
        );
    }

    #[test]
    fn create_rejects_non_string_title() {
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": 42})),
            Err(ValidationError::NotAString("title"))
        );
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": null})),
            Err(ValidationError::NotAString("title"))
        );
    }

    #[test]
    fn create_rejects_non_string_optional_fields() {
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": "ok", "description": 1})),
            Err(ValidationError::NotAString("description"))
        );
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": "ok", "dueDate": false})),
            Err(ValidationError::NotAString("dueDate"))
        );
        // Explicit null is present-and-wrongly-typed, not absent.
        assert_eq!(
            CreateTaskInput::parse(&json!({"title": "ok", "description": null})),
            Err(ValidationError::NotAString("description"))
        );
    }

    #[test]
    fn create_rejects_non_object_input() {
        for value in [json!(null), json!([]), json!("title"), json!(7)] {
            assert_eq!(
                CreateTaskInput::parse(&value),
                Err(ValidationError::NotAnObject)
            );
        }
    }

    #[test]
    fn create_ignores_unknown_fields() {
        let input =
            CreateTaskInput::parse(&json!({"title": "ok", "priority": "high"})).unwrap();
        assert_eq!(input.title, "ok");
    }

    // ── Update ──────────────────────────────────────────────────────────

    #[test]
    fn update_rejects_empty_object() {
        assert_eq!(
            UpdateTaskInput::parse(&json!({})),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn update_rejects_unknown_fields_only() {
        assert_eq!(
            UpdateTaskInput::parse(&json!({"priority": "high"})),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn update_accepts_each_single_field() {
        assert!(UpdateTaskInput::parse(&json!({"title": "x"})).is_ok());
        assert!(UpdateTaskInput::parse(&json!({"description": "x"})).is_ok());
        assert!(UpdateTaskInput::parse(&json!({"dueDate": "2026-09-01"})).is_ok());
        assert!(UpdateTaskInput::parse(&json!({"completed": true})).is_ok());
        // An empty description is a present field, not an absent one.
        assert!(UpdateTaskInput::parse(&json!({"description": ""})).is_ok());
    }

    #[test]
    fn update_rejects_empty_title() {
        assert_eq!(
            UpdateTaskInput::parse(&json!({"title": "  "})),
            Err(ValidationError::EmptyString("title"))
        );
    }

    #[test]
    fn update_rejects_wrongly_typed_fields() {
        assert_eq!(
            UpdateTaskInput::parse(&json!({"completed": "yes"})),
            Err(ValidationError::NotABoolean("completed"))
        );
        assert_eq!(
            UpdateTaskInput::parse(&json!({"completed": null})),
            Err(ValidationError::NotABoolean("completed"))
        );
        assert_eq!(
            UpdateTaskInput::parse(&json!({"dueDate": 20260901})),
            Err(ValidationError::NotAString("dueDate"))
        );
    }

    #[test]
    fn update_parses_all_fields() {
        let input = UpdateTaskInput::parse(&json!({
            "title": "new",
            "description": "d",
            "dueDate": "2026-09-01",
            "completed": true
        }))
        .unwrap();
        assert_eq!(input.title.as_deref(), Some("new"));
        assert_eq!(input.description.as_deref(), Some("d"));
        assert_eq!(input.due_date.as_deref(), Some("2026-09-01"));
        assert_eq!(input.completed, Some(true));
    }

    #[test]
    fn task_serializes_with_camel_case_wire_names() {
        let task = Task {
            id: "t1".into(),
            title: "x".into(),
            description: None,
            due_date: Some("2026-09-01".into()),
            completed: false,
            created_at: "2026-08-29T00:00:00+00:00".into(),
            updated_at: "2026-08-29T00:00:00+00:00".into(),
        };
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["dueDate"], "2026-09-01");
        assert_eq!(v["createdAt"], "2026-08-29T00:00:00+00:00");
        assert_eq!(v["updatedAt"], "2026-08-29T00:00:00+00:00");
        // Absent optionals are omitted from the wire, not serialized as null.
        assert!(v.get("description").is_none());
    }
}
