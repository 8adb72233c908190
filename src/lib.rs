//! Eventlens - workflow event history inspection
//!
//! Parses workflow event histories, picks the single most informative
//! attribute of each event (or group of related events) for a one-line
//! summary, classifies attributes for detail display, and shapes the API
//! requests for listing workflows and for control actions gated by server
//! settings.

pub mod actions;
pub mod cli;
pub mod csv_output;
pub mod event;
pub mod format;
pub mod grouping;
pub mod history;
pub mod json_output;
pub mod predicates;
pub mod query;
pub mod report;
pub mod routes;
pub mod settings;
pub mod summary;

pub use event::{Event, EventGroup, EventType, HistoryItem};
pub use summary::{select_display_attribute, SummaryAttribute, SummaryValue};
