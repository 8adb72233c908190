//! Attribute classification for display
//!
//! Decides whether an attribute is worth showing, whether it renders as
//! plain text or a structured block, and whether it links to another
//! execution, a task queue or a child workflow. Every predicate is total:
//! it accepts any JSON value, including null and empty collections.

use crate::event::Attributes;
use serde_json::Value;

/// Keys whose values render as raw text rather than a code block
const PLAIN_TEXT_KEYS: [&str; 11] = [
    "activityId",
    "attempt",
    "binaryChecksum",
    "identity",
    "parentInitiatedEventId",
    "requestId",
    "scheduledEventId",
    "startedEventId",
    "lastHeartbeatTime",
    "scheduledTime",
    "expirationTime",
];

/// Keys that link to another run of the same workflow
const EXECUTION_LINK_KEYS: [&str; 6] = [
    "baseRunId",
    "continuedExecutionRunId",
    "firstExecutionRunId",
    "newExecutionRunId",
    "newRunId",
    "originalExecutionRunId",
];

const TASK_QUEUE_LINK_KEYS: [&str; 1] = ["taskQueueName"];

/// Keys that link to a child workflow, valid only when both are present
const CHILD_WORKFLOW_LINK_KEYS: [&str; 2] = ["workflowExecutionWorkflowId", "workflowExecutionRunId"];

/// Zero-duration sentinel the API emits for unset timeouts
const ZERO_DURATION: &str = "0s";

/// JavaScript-style truthiness over JSON values
///
/// Null, `false`, `0`, and `""` are falsy; everything else, including
/// empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether the value of `key` should be rendered as raw text
pub fn is_plain_text_key(key: &str) -> bool {
    PLAIN_TEXT_KEYS.contains(&key)
}

/// Eligibility of an attribute for display
///
/// Rejects null, the empty string, the `"0s"` zero-duration sentinel and
/// the synthetic `type` key. Absent attributes never reach this check.
pub fn is_displayable(key: &str, value: &Value) -> bool {
    if key == "type" {
        return false;
    }
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty() && s != ZERO_DURATION,
        _ => true,
    }
}

/// Eligibility of a nested value for its own display region
///
/// Rejects null, the empty string and empty arrays.
pub fn is_eligible_nested_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Whether `key` links to a different execution of the same workflow
pub fn is_execution_link_key(key: &str) -> bool {
    EXECUTION_LINK_KEYS.contains(&key)
}

/// Whether `key` links to a task queue page
pub fn is_task_queue_link_key(key: &str) -> bool {
    TASK_QUEUE_LINK_KEYS.contains(&key)
}

/// Whether `key` links to a child workflow
///
/// Requires both `workflowExecutionWorkflowId` and `workflowExecutionRunId`
/// to be present and non-empty on the same attribute set.
pub fn is_child_workflow_link_key(key: &str, attributes: &Attributes) -> bool {
    let link_attributes_exist = CHILD_WORKFLOW_LINK_KEYS
        .iter()
        .all(|k| attributes.get(*k).is_some_and(is_truthy));

    link_attributes_exist && CHILD_WORKFLOW_LINK_KEYS.contains(&key)
}

/// Depth-first search for the first truthy `stackTrace` field
///
/// Checks the record's own `stackTrace` before descending into its
/// object-valued fields in insertion order. Non-object input yields `None`.
pub fn find_stack_trace(value: &Value) -> Option<&Value> {
    let record = value.as_object()?;
    if let Some(trace) = record.get("stackTrace").filter(|trace| is_truthy(trace)) {
        return Some(trace);
    }

    record
        .values()
        .filter(|nested| nested.is_object())
        .find_map(find_stack_trace)
}

/// The part of a value worth showing in a code block
///
/// Strings pass through; records holding `payloads`, `indexedFields` or
/// `points` (first present wins) show just that field.
pub fn code_block_value(value: &Value) -> &Value {
    if value.is_string() {
        return value;
    }
    ["payloads", "indexedFields", "points"]
        .iter()
        .find_map(|key| value.get(*key).filter(|v| !v.is_null()))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_plain_text_keys() {
        assert!(is_plain_text_key("activityId"));
        assert!(is_plain_text_key("expirationTime"));
        assert!(is_plain_text_key("parentInitiatedEventId"));
        assert!(!is_plain_text_key("input"));
        assert!(!is_plain_text_key("ActivityId"));
        assert!(!is_plain_text_key(""));
    }

    #[test]
    fn test_is_displayable_rejects_sentinels() {
        assert!(!is_displayable("input", &json!(null)));
        assert!(!is_displayable("input", &json!("")));
        assert!(!is_displayable("startToCloseTimeout", &json!("0s")));
        assert!(!is_displayable("type", &json!("activityTaskScheduledEventAttributes")));
    }

    #[test]
    fn test_is_displayable_accepts_values() {
        assert!(is_displayable("attempt", &json!(0)));
        assert!(is_displayable("cancelRequested", &json!(false)));
        assert!(is_displayable("startToCloseTimeout", &json!("10s")));
        assert!(is_displayable("input", &json!({ "payloads": [] })));
        assert!(is_displayable("details", &json!([])));
    }

    #[test]
    fn test_is_eligible_nested_value() {
        assert!(!is_eligible_nested_value(&json!(null)));
        assert!(!is_eligible_nested_value(&json!("")));
        assert!(!is_eligible_nested_value(&json!([])));
        assert!(is_eligible_nested_value(&json!([1])));
        assert!(is_eligible_nested_value(&json!({})));
        assert!(is_eligible_nested_value(&json!(0)));
    }

    #[test]
    fn test_execution_link_keys() {
        for key in EXECUTION_LINK_KEYS {
            assert!(is_execution_link_key(key), "{key} should link");
        }
        assert!(!is_execution_link_key("runId"));
        assert!(!is_execution_link_key("workflowExecutionRunId"));
    }

    #[test]
    fn test_task_queue_link_key() {
        assert!(is_task_queue_link_key("taskQueueName"));
        assert!(!is_task_queue_link_key("taskQueue"));
        assert!(!is_task_queue_link_key("taskQueueKind"));
    }

    #[test]
    fn test_child_workflow_link_requires_both_siblings() {
        let missing_workflow_id = attrs(json!({ "workflowExecutionRunId": "run-1" }));
        assert!(!is_child_workflow_link_key(
            "workflowExecutionRunId",
            &missing_workflow_id
        ));

        let empty_run_id = attrs(json!({
            "workflowExecutionWorkflowId": "child-1",
            "workflowExecutionRunId": ""
        }));
        assert!(!is_child_workflow_link_key(
            "workflowExecutionWorkflowId",
            &empty_run_id
        ));

        let both = attrs(json!({
            "workflowExecutionWorkflowId": "child-1",
            "workflowExecutionRunId": "run-1"
        }));
        assert!(is_child_workflow_link_key("workflowExecutionRunId", &both));
        assert!(is_child_workflow_link_key("workflowExecutionWorkflowId", &both));
        assert!(!is_child_workflow_link_key("workflowTypeName", &both));
    }

    #[test]
    fn test_find_stack_trace_nested() {
        let value = json!({ "a": { "b": { "stackTrace": "trace!" } } });
        assert_eq!(find_stack_trace(&value), Some(&json!("trace!")));
    }

    #[test]
    fn test_find_stack_trace_absent() {
        assert_eq!(find_stack_trace(&json!({ "a": 1 })), None);
        assert_eq!(find_stack_trace(&json!("stackTrace")), None);
        assert_eq!(find_stack_trace(&json!(null)), None);
        assert_eq!(find_stack_trace(&json!([{ "stackTrace": "x" }])), None);
    }

    #[test]
    fn test_find_stack_trace_skips_empty_and_searches_siblings() {
        let value = json!({
            "stackTrace": "",
            "message": "activity failed",
            "first": { "detail": 1 },
            "cause": { "stackTrace": "at charge()" }
        });
        assert_eq!(find_stack_trace(&value), Some(&json!("at charge()")));
    }

    #[test]
    fn test_find_stack_trace_prefers_outermost() {
        let value = json!({
            "cause": { "stackTrace": "inner" },
            "stackTrace": "outer"
        });
        assert_eq!(find_stack_trace(&value), Some(&json!("outer")));
    }

    #[test]
    fn test_code_block_value() {
        assert_eq!(code_block_value(&json!("plain")), &json!("plain"));

        let payloads = json!({ "payloads": [{ "id": 1 }], "other": true });
        assert_eq!(code_block_value(&payloads), &json!([{ "id": 1 }]));

        let search = json!({ "indexedFields": { "CustomKeyword": "x" } });
        assert_eq!(code_block_value(&search), &json!({ "CustomKeyword": "x" }));

        let plain_record = json!({ "name": "Charge" });
        assert_eq!(code_block_value(&plain_record), &plain_record);
    }
}
