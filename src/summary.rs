//! One-line event summaries
//!
//! Picks the single attribute of an event (or of a group's last event)
//! that best describes it in a history list:
//!
//! 1. local activity markers show the activity type recorded in the marker
//!    payload
//! 2. otherwise the first eligible preferred key, in priority order
//! 3. otherwise the first eligible attribute in producer order
//!
//! Object values are unwrapped exactly one level: `workflowType: {name:
//! "Foo"}` summarizes as `workflowTypeName: "Foo"`. The first nested key is
//! taken in producer order, so multi-key records depend on the producer's
//! field ordering.

use crate::event::{Attributes, Event, HistoryItem};
use crate::format::capitalize;
use crate::predicates::{is_displayable, is_truthy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Attribute names most informative for a summary, highest priority first
pub const PREFERRED_SUMMARY_KEYS: [&str; 7] = [
    "failure",
    "input",
    "activityType",
    "parentInitiatedEventId",
    "workflowExecution",
    "workflowType",
    "taskQueue",
];

/// Key used for activity types found in local activity marker payloads
const MARKER_ACTIVITY_TYPE_KEY: &str = "ActivityType";

/// Display value of a summary: plain text or a structured record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Text(String),
    Record(Value),
}

impl SummaryValue {
    /// Value found one level inside an object-valued attribute
    fn from_nested(value: &Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => SummaryValue::Record(value.clone()),
            scalar => SummaryValue::Text(scalar_to_string(scalar)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SummaryValue::Text(text) => Some(text),
            SummaryValue::Record(_) => None,
        }
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Text(text) => f.write_str(text),
            SummaryValue::Record(value) => write!(f, "{}", value),
        }
    }
}

/// The attribute chosen to summarize an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryAttribute {
    pub key: String,
    pub value: SummaryValue,
}

impl SummaryAttribute {
    /// The empty summary: `{ key: "", value: "" }`
    pub fn empty() -> Self {
        Self::text("", "")
    }

    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: SummaryValue::Text(value.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value == SummaryValue::Text(String::new())
    }
}

impl Default for SummaryAttribute {
    fn default() -> Self {
        Self::empty()
    }
}

/// Select the attribute that best summarizes an event or event group
///
/// Never fails: missing data degrades to a best-effort pick or to
/// [`SummaryAttribute::empty`]. The input is only read.
pub fn select_display_attribute(item: Option<HistoryItem<'_>>) -> SummaryAttribute {
    match item {
        Some(item) => summarize_event(item.working_event()),
        None => SummaryAttribute::empty(),
    }
}

fn summarize_event(event: &Event) -> SummaryAttribute {
    let first = first_display_attribute(&event.attributes);

    if event.is_local_activity_marker() {
        if let Some(activity_type) = marker_activity_type(&event.attributes) {
            tracing::trace!(event_id = %event.id, "summarizing local activity marker");
            return format_summary_value(MARKER_ACTIVITY_TYPE_KEY, activity_type);
        }
    }

    for preferred in PREFERRED_SUMMARY_KEYS {
        if let Some(value) = event.attributes.get(preferred) {
            if is_displayable(preferred, value) {
                return format_summary_value(preferred, value);
            }
        }
    }

    first.unwrap_or_default()
}

/// First attribute eligible for display, in producer order
fn first_display_attribute(attributes: &Attributes) -> Option<SummaryAttribute> {
    attributes
        .iter()
        .find(|(key, value)| is_displayable(key, value))
        .map(|(key, value)| format_summary_value(key, value))
}

/// First payload recorded in a marker's details
///
/// Raw histories nest it under `markerRecordedEventAttributes`; normalized
/// marker events carry `details` at the top level.
fn marker_payload(attributes: &Attributes) -> Option<&Value> {
    attributes
        .get("markerRecordedEventAttributes")
        .and_then(|marker| marker.get("details"))
        .or_else(|| attributes.get("details"))?
        .get("data")?
        .get("payloads")?
        .get(0)
}

/// Activity type recorded in the marker payload
///
/// A present `ActivityType` shadows `activity_type` even when it is null;
/// only a truthy value counts as a hit.
fn marker_activity_type(attributes: &Attributes) -> Option<&Value> {
    let payload = marker_payload(attributes)?;
    payload
        .get("ActivityType")
        .or_else(|| payload.get("activity_type"))
        .filter(|value| is_truthy(value))
}

/// Render a selected attribute, unwrapping object values one level
fn format_summary_value(key: &str, value: &Value) -> SummaryAttribute {
    match value {
        Value::Object(record) => match record.iter().next() {
            Some((first_key, nested)) => SummaryAttribute {
                key: format!("{}{}", key, capitalize(first_key)),
                value: SummaryValue::from_nested(nested),
            },
            None => SummaryAttribute::text(key, ""),
        },
        Value::Array(_) => SummaryAttribute {
            key: key.to_string(),
            value: SummaryValue::Record(value.clone()),
        },
        scalar => SummaryAttribute::text(key, scalar_to_string(scalar)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
