//! JSON output format for history summaries
//!
//! `--format json` implementation for `summarize` and `inspect`

use crate::report::{AttributeRow, SummaryRow};
use serde::Serialize;

/// Totals for a summarized history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonTotals {
    /// Number of list rows (groups count once)
    pub rows: usize,
    /// Number of grouped rows
    pub groups: usize,
    /// Number of history events covered by the rows
    pub events: usize,
    /// Rows whose summary came out empty
    pub empty_summaries: usize,
}

/// Root JSON output structure for `summarize`
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub rows: Vec<SummaryRow>,
    pub totals: JsonTotals,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "eventlens-json-v1".to_string(),
            rows: Vec::new(),
            totals: JsonTotals::default(),
        }
    }

    /// Add a summary row to the output
    pub fn add_row(&mut self, row: SummaryRow) {
        self.totals.rows += 1;
        match &row.group {
            Some(group) => {
                self.totals.groups += 1;
                self.totals.events += group.events;
            }
            None => self.totals.events += 1,
        }
        if row.summary.is_empty() {
            self.totals.empty_summaries += 1;
        }
        self.rows.push(row);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON output for `inspect`: one event's detail rows
#[derive(Debug, Clone, Serialize)]
pub struct JsonEventDetail {
    pub id: String,
    pub event_type: String,
    pub attributes: Vec<AttributeRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl JsonEventDetail {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
