//! Grouping related history events
//!
//! An activity's scheduled/started/completed events, a timer's start and
//! fire, a child workflow's lifecycle, and the initiated/resolved pairs of
//! external signals and cancellations each collapse into one
//! [`EventGroup`]. Later events find their group through the id of the
//! initiating event they reference.

use crate::event::{Attributes, Event, EventGroup, EventType, GroupCategory, HistoryItem};
use std::collections::HashMap;

/// Attributes through which a later event references its initiating event,
/// checked in order
const LINK_KEYS: [&str; 3] = ["scheduledEventId", "initiatedEventId", "startedEventId"];

/// One row of a grouped history: a group or an event that belongs to none
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Event(Event),
    Group(EventGroup),
}

impl HistoryEntry {
    pub fn as_item(&self) -> HistoryItem<'_> {
        match self {
            HistoryEntry::Event(event) => HistoryItem::Event(event),
            HistoryEntry::Group(group) => HistoryItem::Group(group),
        }
    }

    /// Id of the event that opens this entry
    pub fn id(&self) -> &str {
        match self {
            HistoryEntry::Event(event) => &event.id,
            HistoryEntry::Group(group) => &group.id,
        }
    }
}

/// Category of group an event opens, if it opens one
fn initiating_category(event: &Event) -> Option<GroupCategory> {
    match event.event_type {
        EventType::ActivityTaskScheduled => Some(GroupCategory::Activity),
        EventType::TimerStarted => Some(GroupCategory::Timer),
        EventType::StartChildWorkflowExecutionInitiated => Some(GroupCategory::ChildWorkflow),
        EventType::SignalExternalWorkflowExecutionInitiated => Some(GroupCategory::SignalExternal),
        EventType::RequestCancelExternalWorkflowExecutionInitiated => {
            Some(GroupCategory::CancelExternal)
        }
        EventType::MarkerRecorded if event.is_local_activity_marker() => {
            Some(GroupCategory::LocalActivity)
        }
        _ => None,
    }
}

fn string_at<'a>(attributes: &'a Attributes, path: &[&str]) -> Option<&'a str> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(attributes.get(*first)?, |current, key| current.get(*key))?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Display name of a group, taken from its initiating event
fn group_name(category: GroupCategory, event: &Event) -> String {
    let attributes = &event.attributes;
    let name = match category {
        GroupCategory::Activity => string_at(attributes, &["activityType", "name"]),
        GroupCategory::Timer => string_at(attributes, &["timerId"]),
        GroupCategory::ChildWorkflow => string_at(attributes, &["workflowType", "name"]),
        GroupCategory::SignalExternal => string_at(attributes, &["signalName"]),
        GroupCategory::CancelExternal => {
            string_at(attributes, &["workflowExecution", "workflowId"])
        }
        GroupCategory::LocalActivity => None,
    };

    if let Some(name) = name {
        return name.to_string();
    }
    match event.summary() {
        summary if !summary.is_empty() => summary.value.to_string(),
        _ => event.event_type.to_string(),
    }
}

/// Collapse a flat history into groups and standalone events
///
/// Entries keep history order, positioned by their first event. Events
/// referencing an initiating event that is not in `events` stay
/// standalone.
pub fn group_events(events: Vec<Event>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::with_capacity(events.len());
    let mut open_groups: HashMap<String, usize> = HashMap::new();

    for event in events {
        if let Some(category) = initiating_category(&event) {
            let name = group_name(category, &event);
            open_groups.insert(event.id.clone(), entries.len());
            entries.push(HistoryEntry::Group(EventGroup::new(category, name, event)));
            continue;
        }

        let owner = LINK_KEYS
            .iter()
            .filter_map(|key| event.attribute_id(key))
            .find_map(|id| open_groups.get(&id).copied());

        match owner {
            Some(index) => {
                if let HistoryEntry::Group(group) = &mut entries[index] {
                    group.push(event);
                }
            }
            None => entries.push(HistoryEntry::Event(event)),
        }
    }

    tracing::debug!(
        entries = entries.len(),
        groups = open_groups.len(),
        "grouped workflow history"
    );
    entries
}
