//! CSV output format for history summaries
//!
//! One row per history list entry, for spreadsheet analysis

use crate::report::SummaryRow;

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    rows: Vec<SummaryRow>,
    include_groups: bool,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new(include_groups: bool) -> Self {
        Self {
            rows: Vec::new(),
            include_groups,
        }
    }

    /// Add a summary row to the output
    pub fn add_row(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    /// Generate CSV header row based on enabled flags
    fn header(&self) -> String {
        let mut headers = vec!["id", "event_type"];

        if self.include_groups {
            headers.extend(["group", "category", "events"]);
        }

        headers.extend(["key", "value"]);
        headers.join(",")
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a summary row as a CSV line
    fn format_row(&self, row: &SummaryRow) -> String {
        let mut fields = vec![
            Self::escape_field(&row.id),
            Self::escape_field(&row.event_type),
        ];

        if self.include_groups {
            match &row.group {
                Some(group) => {
                    fields.push(Self::escape_field(&group.name));
                    fields.push(group.category.as_str().to_string());
                    fields.push(group.events.to_string());
                }
                None => fields.extend([String::new(), String::new(), "1".to_string()]),
            }
        }

        fields.push(Self::escape_field(&row.summary.key));
        fields.push(Self::escape_field(&row.value_text()));
        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.format_row(row));
            output.push('\n');
        }

        output
    }
}
