//! Loading workflow histories from JSON
//!
//! Accepts the shapes the API and the UI export tooling produce:
//! - `{"history": {"events": [...]}}` (GetWorkflowExecutionHistory response)
//! - `{"events": [...]}`
//! - a bare `[...]` array of events

use crate::event::Event;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or shaping a history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Event of type {0} has no event id")]
    MissingEventId(String),

    #[error("An event group needs at least one event")]
    EmptyGroup,

    #[error("Expected a history object or event array, found a JSON {0}")]
    UnsupportedShape(&'static str),

    #[error("Invalid history JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read history file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Parse a history document from a JSON string
pub fn parse_history(content: &str) -> Result<Vec<Event>> {
    let value: Value = serde_json::from_str(content)?;
    let events_value = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("history") {
            Some(mut history) => history
                .as_object_mut()
                .and_then(|history| history.remove("events"))
                .unwrap_or_default(),
            None => map.remove("events").unwrap_or_default(),
        },
        other => return Err(HistoryError::UnsupportedShape(json_kind(&other))),
    };

    let events: Vec<Event> = if events_value.is_null() {
        Vec::new()
    } else {
        serde_json::from_value(events_value)?
    };

    tracing::debug!(events = events.len(), "parsed workflow history");
    Ok(events)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Load a history document from a file
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| HistoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_history(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RESPONSE: &str = r#"{
        "history": {
            "events": [
                {
                    "eventId": "1",
                    "eventType": "EVENT_TYPE_WORKFLOW_EXECUTION_STARTED",
                    "workflowExecutionStartedEventAttributes": {
                        "workflowType": { "name": "Checkout" },
                        "taskQueue": { "name": "orders", "kind": "Normal" }
                    }
                },
                {
                    "eventId": "2",
                    "eventType": "EVENT_TYPE_WORKFLOW_TASK_SCHEDULED",
                    "workflowTaskScheduledEventAttributes": {
                        "startToCloseTimeout": "10s",
                        "attempt": 1
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_api_response() {
        let events = parse_history(RESPONSE).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::WorkflowExecutionStarted);
        assert_eq!(events[1].id, "2");
    }

    #[test]
    fn test_parse_event_list_and_bare_array() {
        let list = r#"{"events": [{"id": "1", "eventType": "TimerStarted", "attributes": {"timerId": "a"}}]}"#;
        assert_eq!(parse_history(list).unwrap().len(), 1);

        let bare = r#"[{"id": "1", "eventType": "TimerStarted", "attributes": {}}]"#;
        assert_eq!(parse_history(bare).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_empty_history() {
        assert!(parse_history(r#"{"history": {}}"#).unwrap().is_empty());
        assert!(parse_history("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_history("{not json"),
            Err(HistoryError::Json(_))
        ));
        assert!(matches!(
            parse_history("42"),
            Err(HistoryError::UnsupportedShape("number"))
        ));
    }

    #[test]
    fn test_parse_event_without_id_reports_error() {
        let err = parse_history(r#"[{"eventType": "TimerFired", "attributes": {}}]"#).unwrap_err();
        assert!(err.to_string().contains("no event id"));
    }

    #[test]
    fn test_load_history_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(RESPONSE.as_bytes())?;

        let events = load_history(file.path())?;
        assert_eq!(events.len(), 2);
        Ok(())
    }

    #[test]
    fn test_load_history_missing_file() {
        let err = load_history("/nonexistent/history.json").unwrap_err();
        assert!(matches!(err, HistoryError::Io { .. }));
    }
}
