//! Workflow history event model
//!
//! Events carry a type discriminator and an insertion-ordered attribute bag.
//! Related events are clustered into [`EventGroup`]s, and anything that can
//! be summarized is addressed through the [`HistoryItem`] sum type.

use crate::history::HistoryError;
use crate::summary::{select_display_attribute, SummaryAttribute};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Attribute bag of a single event, in producer order
pub type Attributes = Map<String, Value>;

/// Marker names used by SDKs when recording a local activity
const LOCAL_ACTIVITY_MARKER_NAMES: [&str; 2] = ["LocalActivity", "core_local_activity"];

macro_rules! event_types {
    ($($variant:ident),+ $(,)?) => {
        /// Workflow history event type
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum EventType {
            $($variant,)+
            /// Event type not known to this crate (kept verbatim)
            Other(String),
        }

        impl EventType {
            /// PascalCase name, e.g. `ActivityTaskScheduled`
            pub fn as_str(&self) -> &str {
                match self {
                    $(EventType::$variant => stringify!($variant),)+
                    EventType::Other(name) => name,
                }
            }

            fn from_pascal(name: &str) -> Self {
                match name {
                    $(stringify!($variant) => EventType::$variant,)+
                    other => EventType::Other(other.to_string()),
                }
            }
        }
    };
}

event_types! {
    WorkflowExecutionStarted,
    WorkflowExecutionCompleted,
    WorkflowExecutionFailed,
    WorkflowExecutionTimedOut,
    WorkflowExecutionCancelRequested,
    WorkflowExecutionCanceled,
    WorkflowExecutionSignaled,
    WorkflowExecutionTerminated,
    WorkflowExecutionContinuedAsNew,
    WorkflowTaskScheduled,
    WorkflowTaskStarted,
    WorkflowTaskCompleted,
    WorkflowTaskTimedOut,
    WorkflowTaskFailed,
    ActivityTaskScheduled,
    ActivityTaskStarted,
    ActivityTaskCompleted,
    ActivityTaskFailed,
    ActivityTaskTimedOut,
    ActivityTaskCancelRequested,
    ActivityTaskCanceled,
    TimerStarted,
    TimerFired,
    TimerCanceled,
    MarkerRecorded,
    StartChildWorkflowExecutionInitiated,
    StartChildWorkflowExecutionFailed,
    ChildWorkflowExecutionStarted,
    ChildWorkflowExecutionCompleted,
    ChildWorkflowExecutionFailed,
    ChildWorkflowExecutionCanceled,
    ChildWorkflowExecutionTimedOut,
    ChildWorkflowExecutionTerminated,
    SignalExternalWorkflowExecutionInitiated,
    SignalExternalWorkflowExecutionFailed,
    ExternalWorkflowExecutionSignaled,
    RequestCancelExternalWorkflowExecutionInitiated,
    RequestCancelExternalWorkflowExecutionFailed,
    ExternalWorkflowExecutionCancelRequested,
    UpsertWorkflowSearchAttributes,
}

impl EventType {
    /// Parse a type name in any of the shapes the API emits
    ///
    /// Accepts `ActivityTaskScheduled`, `activityTaskScheduled` and the
    /// protobuf enum form `EVENT_TYPE_ACTIVITY_TASK_SCHEDULED`.
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.contains('_') || trimmed.chars().all(|c| !c.is_lowercase()) {
            let body = trimmed.strip_prefix("EVENT_TYPE_").unwrap_or(trimmed);
            let pascal: String = body
                .split('_')
                .filter(|part| !part.is_empty())
                .map(|part| crate::format::capitalize(&part.to_lowercase()))
                .collect();
            return Self::from_pascal(&pascal);
        }
        Self::from_pascal(&crate::format::capitalize(trimmed))
    }

    /// Key of the type-specific attribute object in raw history JSON,
    /// e.g. `activityTaskScheduledEventAttributes`
    pub fn attributes_key(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!(
                "{}{}EventAttributes",
                first.to_lowercase(),
                chars.as_str()
            ),
            None => "EventAttributes".to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventType::from_name(&name))
    }
}

/// A single workflow history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEvent")]
pub struct Event {
    /// Event id, unique within one execution's history
    pub id: String,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    pub attributes: Attributes,
}

/// Wire shape accepted for events
///
/// Either the normalized form (`id` + `attributes`) or the raw API form
/// (`eventId` + `<type>EventAttributes`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    event_id: Option<Value>,
    event_type: EventType,
    #[serde(default)]
    event_time: Option<String>,
    #[serde(default)]
    attributes: Option<Attributes>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawEvent> for Event {
    type Error = HistoryError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let id = match raw.event_id.or(raw.id) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(HistoryError::MissingEventId(raw.event_type.to_string())),
        };

        let attributes = match raw.attributes {
            Some(attributes) => attributes,
            None => raw
                .rest
                .into_iter()
                .find(|(key, value)| key.ends_with("EventAttributes") && value.is_object())
                .map(|(key, value)| {
                    let mut attributes = Attributes::new();
                    attributes.insert("type".to_string(), Value::String(key));
                    if let Value::Object(inner) = value {
                        attributes.extend(inner);
                    }
                    attributes
                })
                .unwrap_or_default(),
        };

        Ok(Event {
            id,
            event_type: raw.event_type,
            event_time: raw.event_time,
            attributes,
        })
    }
}

impl Event {
    /// Create an event from an already-normalized attribute bag
    pub fn new(id: impl Into<String>, event_type: EventType, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            event_type,
            event_time: None,
            attributes,
        }
    }

    /// Look up a top-level attribute
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Top-level attribute rendered as an id string (ids arrive as strings
    /// or numbers depending on the producer)
    pub fn attribute_id(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether this is a marker event recording a local activity
    pub fn is_local_activity_marker(&self) -> bool {
        if self.event_type != EventType::MarkerRecorded {
            return false;
        }

        let marker_name = self
            .attributes
            .get("markerName")
            .or_else(|| {
                self.attributes
                    .get("markerRecordedEventAttributes")
                    .and_then(|marker| marker.get("markerName"))
            })
            .and_then(Value::as_str);

        marker_name.is_some_and(|name| LOCAL_ACTIVITY_MARKER_NAMES.contains(&name))
    }

    /// One-line summary of this event
    pub fn summary(&self) -> SummaryAttribute {
        select_display_attribute(Some(HistoryItem::Event(self)))
    }
}

/// Kind of logical unit an [`EventGroup`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupCategory {
    Activity,
    LocalActivity,
    Timer,
    ChildWorkflow,
    SignalExternal,
    CancelExternal,
}

impl GroupCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupCategory::Activity => "activity",
            GroupCategory::LocalActivity => "local-activity",
            GroupCategory::Timer => "timer",
            GroupCategory::ChildWorkflow => "child-workflow",
            GroupCategory::SignalExternal => "signal-external",
            GroupCategory::CancelExternal => "cancel-external",
        }
    }
}

/// A cluster of related events, e.g. an activity's scheduled, started and
/// completed events
///
/// A group always holds at least its initiating event, so
/// [`EventGroup::last_event`] is total.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGroup {
    /// Id of the initiating event
    pub id: String,
    /// Display name (activity type, timer id, child workflow type, ...)
    pub name: String,
    pub category: GroupCategory,
    initial: Event,
    rest: Vec<Event>,
}

impl EventGroup {
    /// Start a group from its initiating event
    pub fn new(category: GroupCategory, name: impl Into<String>, initial: Event) -> Self {
        Self {
            id: initial.id.clone(),
            name: name.into(),
            category,
            initial,
            rest: Vec::new(),
        }
    }

    /// Build a group from an ordered list of events
    ///
    /// # Errors
    /// Returns [`HistoryError::EmptyGroup`] if `events` is empty.
    pub fn from_events(
        category: GroupCategory,
        name: impl Into<String>,
        events: Vec<Event>,
    ) -> Result<Self, HistoryError> {
        let mut events = events.into_iter();
        let initial = events.next().ok_or(HistoryError::EmptyGroup)?;
        let mut group = Self::new(category, name, initial);
        group.rest.extend(events);
        Ok(group)
    }

    /// Append a later event to the group
    pub fn push(&mut self, event: Event) {
        self.rest.push(event);
    }

    pub fn initial_event(&self) -> &Event {
        &self.initial
    }

    /// Most recent event in the group
    pub fn last_event(&self) -> &Event {
        self.rest.last().unwrap_or(&self.initial)
    }

    /// All events in history order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        std::iter::once(&self.initial).chain(self.rest.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// One-line summary of the group (the summary of its last event)
    pub fn summary(&self) -> SummaryAttribute {
        select_display_attribute(Some(HistoryItem::Group(self)))
    }
}

/// Anything the summary selector accepts: a bare event or a group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryItem<'a> {
    Event(&'a Event),
    Group(&'a EventGroup),
}

impl<'a> HistoryItem<'a> {
    /// The event summaries and classifications operate on: the event
    /// itself, or a group's last event
    pub fn working_event(&self) -> &'a Event {
        match *self {
            HistoryItem::Event(event) => event,
            HistoryItem::Group(group) => group.last_event(),
        }
    }

    pub fn summary(&self) -> SummaryAttribute {
        select_display_attribute(Some(*self))
    }
}

impl<'a> From<&'a Event> for HistoryItem<'a> {
    fn from(event: &'a Event) -> Self {
        HistoryItem::Event(event)
    }
}

impl<'a> From<&'a EventGroup> for HistoryItem<'a> {
    fn from(group: &'a EventGroup) -> Self {
        HistoryItem::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_from(value: Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_event_type_from_name_shapes() {
        assert_eq!(
            EventType::from_name("ActivityTaskScheduled"),
            EventType::ActivityTaskScheduled
        );
        assert_eq!(
            EventType::from_name("activityTaskScheduled"),
            EventType::ActivityTaskScheduled
        );
        assert_eq!(
            EventType::from_name("EVENT_TYPE_ACTIVITY_TASK_SCHEDULED"),
            EventType::ActivityTaskScheduled
        );
        assert_eq!(
            EventType::from_name("EVENT_TYPE_MARKER_RECORDED"),
            EventType::MarkerRecorded
        );
    }

    #[test]
    fn test_event_type_unknown_kept() {
        let ty = EventType::from_name("WorkflowExecutionUpdateAccepted");
        assert_eq!(
            ty,
            EventType::Other("WorkflowExecutionUpdateAccepted".to_string())
        );
        assert_eq!(ty.as_str(), "WorkflowExecutionUpdateAccepted");
    }

    #[test]
    fn test_attributes_key() {
        assert_eq!(
            EventType::MarkerRecorded.attributes_key(),
            "markerRecordedEventAttributes"
        );
        assert_eq!(
            EventType::TimerStarted.attributes_key(),
            "timerStartedEventAttributes"
        );
    }

    #[test]
    fn test_deserialize_raw_api_event() {
        let event = event_from(json!({
            "eventId": "5",
            "eventTime": "2024-01-01T00:00:00Z",
            "eventType": "EVENT_TYPE_ACTIVITY_TASK_SCHEDULED",
            "activityTaskScheduledEventAttributes": {
                "activityId": "1",
                "activityType": { "name": "Charge" }
            }
        }));

        assert_eq!(event.id, "5");
        assert_eq!(event.event_type, EventType::ActivityTaskScheduled);
        assert_eq!(event.event_time.as_deref(), Some("2024-01-01T00:00:00Z"));

        let keys: Vec<&str> = event.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "activityId", "activityType"]);
        assert_eq!(
            event.attribute("type"),
            Some(&json!("activityTaskScheduledEventAttributes"))
        );
    }

    #[test]
    fn test_deserialize_normalized_event_with_numeric_id() {
        let event = event_from(json!({
            "id": 12,
            "eventType": "TimerFired",
            "attributes": { "timerId": "t1", "startedEventId": 9 }
        }));

        assert_eq!(event.id, "12");
        assert_eq!(event.event_type, EventType::TimerFired);
        assert_eq!(event.attribute_id("startedEventId").as_deref(), Some("9"));
    }

    #[test]
    fn test_deserialize_missing_id_fails() {
        let result: Result<Event, _> = serde_json::from_value(json!({
            "eventType": "TimerFired",
            "attributes": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_event_serialization_round_trip_shape() {
        let event = Event::new(
            "3",
            EventType::WorkflowTaskStarted,
            json!({ "identity": "worker@host" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded["eventType"], json!("WorkflowTaskStarted"));
        assert!(encoded.get("eventTime").is_none());

        let decoded: Event = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_local_activity_marker_classification() {
        let marker = event_from(json!({
            "id": "7",
            "eventType": "MarkerRecorded",
            "attributes": { "markerName": "LocalActivity" }
        }));
        assert!(marker.is_local_activity_marker());

        let core_marker = event_from(json!({
            "eventId": "8",
            "eventType": "EVENT_TYPE_MARKER_RECORDED",
            "markerRecordedEventAttributes": { "markerName": "core_local_activity" }
        }));
        assert!(core_marker.is_local_activity_marker());

        let version_marker = event_from(json!({
            "id": "9",
            "eventType": "MarkerRecorded",
            "attributes": { "markerName": "Version" }
        }));
        assert!(!version_marker.is_local_activity_marker());

        let not_a_marker = event_from(json!({
            "id": "10",
            "eventType": "TimerStarted",
            "attributes": { "markerName": "LocalActivity" }
        }));
        assert!(!not_a_marker.is_local_activity_marker());
    }

    #[test]
    fn test_group_last_event() {
        let scheduled = Event::new("5", EventType::ActivityTaskScheduled, Attributes::new());
        let started = Event::new("6", EventType::ActivityTaskStarted, Attributes::new());

        let mut group = EventGroup::new(GroupCategory::Activity, "Charge", scheduled.clone());
        assert_eq!(group.last_event().id, "5");
        assert_eq!(group.len(), 1);

        group.push(started);
        assert_eq!(group.id, "5");
        assert_eq!(group.last_event().id, "6");
        assert_eq!(group.initial_event(), &scheduled);
        assert_eq!(group.events().count(), 2);
    }

    #[test]
    fn test_group_from_empty_events_fails() {
        let result = EventGroup::from_events(GroupCategory::Timer, "t", Vec::new());
        assert!(matches!(result, Err(HistoryError::EmptyGroup)));
    }

    #[test]
    fn test_history_item_working_event() {
        let scheduled = Event::new("5", EventType::ActivityTaskScheduled, Attributes::new());
        let completed = Event::new("7", EventType::ActivityTaskCompleted, Attributes::new());
        let group = EventGroup::from_events(
            GroupCategory::Activity,
            "Charge",
            vec![scheduled.clone(), completed],
        )
        .unwrap();

        assert_eq!(HistoryItem::from(&scheduled).working_event().id, "5");
        assert_eq!(HistoryItem::from(&group).working_event().id, "7");
    }
}
