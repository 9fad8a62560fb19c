use crate::csv_processor::CsvTable;
use crate::records::ContentRow;
use crate::utils::{Result, WorkflowError};
use std::collections::{BTreeMap, HashSet};

/// `COLUMN=VALUE` conditions on the title list. Values given for the same
/// column are alternatives; different columns must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    accepted: BTreeMap<String, Vec<String>>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(conditions: &[String]) -> Result<Self> {
        let mut filter = Self::new();
        for condition in conditions {
            let (column, value) = condition.split_once('=').ok_or_else(|| {
                WorkflowError::ConfigError(format!("filter '{}' is not COLUMN=VALUE", condition))
            })?;
            filter.allow(column.trim(), value.trim());
        }
        Ok(filter)
    }

    pub fn allow(&mut self, column: &str, value: &str) {
        self.accepted
            .entry(column.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn matches(&self, table: &CsvTable, row: &[String]) -> Result<bool> {
        for (column, values) in &self.accepted {
            table.require_column(column)?;
            let cell = table.cell(row, column).unwrap_or("").trim();
            if !values.iter().any(|v| v == cell) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Keeps the CMS posts whose title appears in the (filtered) title list.
/// Output rows carry `title` and `content` only, in posts order.
pub fn select_posts(
    titles: &CsvTable,
    title_column: &str,
    filter: &RowFilter,
    posts: &CsvTable,
) -> Result<Vec<ContentRow>> {
    titles.require_column(title_column)?;
    posts.require_column("id")?;
    posts.require_column("title")?;

    let mut wanted = HashSet::new();
    for row in &titles.rows {
        if filter.matches(titles, row)? {
            if let Some(title) = titles.cell(row, title_column) {
                wanted.insert(title.trim().to_string());
            }
        }
    }

    let mut selected = Vec::new();
    for (line, row) in posts.rows.iter().enumerate() {
        let title = posts.cell(row, "title").unwrap_or("");
        if !wanted.contains(title.trim()) {
            continue;
        }
        let raw_id = posts.cell(row, "id").unwrap_or("").trim();
        let id = raw_id.parse().map_err(|_| {
            WorkflowError::MalformedRecord(format!("posts row {}: invalid id '{}'", line + 1, raw_id))
        })?;
        selected.push(
            ContentRow::new(id)
                .with("title", title)
                .with("content", posts.cell(row, "content").unwrap_or("")),
        );
    }
    Ok(selected)
}
