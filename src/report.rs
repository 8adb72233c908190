//! Display rows for history lists and event detail views
//!
//! A [`SummaryRow`] is one line of a history list: an event or group with
//! its selected summary attribute. [`attribute_rows`] expands a single
//! event into labelled detail rows, each tagged with how it should render.

use crate::event::{Attributes, Event, GroupCategory, HistoryItem};
use crate::format::{capitalize, format_camel_case};
use crate::predicates::{
    code_block_value, find_stack_trace, is_child_workflow_link_key, is_displayable,
    is_eligible_nested_value, is_execution_link_key, is_plain_text_key,
    is_task_queue_link_key,
};
use crate::summary::{SummaryAttribute, SummaryValue};
use serde::Serialize;
use serde_json::Value;

/// What an attribute value links to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// Another run of the same workflow
    Execution,
    TaskQueue,
    ChildWorkflow,
}

/// How a detail value renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "target")]
pub enum DisplayMode {
    /// Raw text (ids, timestamps, identities)
    PlainText,
    /// Formatted scalar
    Text,
    /// Structured value shown as JSON
    CodeBlock,
    Link(LinkKind),
}

/// Group information attached to a summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupInfo {
    pub name: String,
    pub category: GroupCategory,
    pub events: usize,
}

/// One line of a history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Id of the event (or of the group's initiating event)
    pub id: String,
    /// Type of the event the summary was taken from
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupInfo>,
    pub summary: SummaryAttribute,
    /// Human label for the summary key
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl SummaryRow {
    pub fn from_item(item: HistoryItem<'_>) -> Self {
        let working = item.working_event();
        let (id, group) = match item {
            HistoryItem::Event(event) => (event.id.clone(), None),
            HistoryItem::Group(group) => (
                group.id.clone(),
                Some(GroupInfo {
                    name: group.name.clone(),
                    category: group.category,
                    events: group.len(),
                }),
            ),
        };
        let summary = item.summary();

        Self {
            id,
            event_type: working.event_type.to_string(),
            group,
            label: format_camel_case(&summary.key),
            summary,
            stack_trace: event_stack_trace(working),
        }
    }

    /// Summary value as a single display line
    pub fn value_text(&self) -> String {
        match &self.summary.value {
            SummaryValue::Text(text) => text.clone(),
            SummaryValue::Record(value) => code_block_value(value).to_string(),
        }
    }
}

/// First stack trace found anywhere in an event's attributes
pub fn event_stack_trace(event: &Event) -> Option<String> {
    let record = Value::Object(event.attributes.clone());
    find_stack_trace(&record).map(|trace| match trace {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Flatten an attribute bag one level for detail display
///
/// Displayable object values are replaced by their eligible fields under
/// `<key><CapitalizedField>`; other values keep their key. This is the
/// attribute set link classification runs against.
pub fn flatten_attributes(attributes: &Attributes) -> Attributes {
    let mut combined = Attributes::new();
    for (key, value) in attributes {
        if !is_displayable(key, value) {
            continue;
        }
        match value {
            Value::Object(record) if !record.is_empty() => {
                for (nested_key, nested) in record {
                    if is_eligible_nested_value(nested) {
                        combined.insert(
                            format!("{}{}", key, capitalize(nested_key)),
                            nested.clone(),
                        );
                    }
                }
            }
            _ => {
                combined.insert(key.clone(), value.clone());
            }
        }
    }
    combined
}

/// One labelled attribute of an event detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRow {
    pub key: String,
    pub label: String,
    pub value: Value,
    pub display: DisplayMode,
}

fn link_kind(key: &str, combined: &Attributes) -> Option<LinkKind> {
    if is_execution_link_key(key) {
        Some(LinkKind::Execution)
    } else if is_task_queue_link_key(key) {
        Some(LinkKind::TaskQueue)
    } else if is_child_workflow_link_key(key, combined) {
        Some(LinkKind::ChildWorkflow)
    } else {
        None
    }
}

/// Detail rows for every displayable attribute of `event`
pub fn attribute_rows(event: &Event) -> Vec<AttributeRow> {
    let combined = flatten_attributes(&event.attributes);
    combined
        .iter()
        .map(|(key, value)| {
            let display = match link_kind(key, &combined) {
                Some(link) => DisplayMode::Link(link),
                None if is_plain_text_key(key) => DisplayMode::PlainText,
                None if value.is_object() || value.is_array() => DisplayMode::CodeBlock,
                None => DisplayMode::Text,
            };
            let value = match display {
                DisplayMode::CodeBlock => code_block_value(value).clone(),
                _ => value.clone(),
            };
            AttributeRow {
                key: key.clone(),
                label: format_camel_case(key),
                value,
                display,
            }
        })
        .collect()
}
