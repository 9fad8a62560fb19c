use crate::csv_processor::CsvTable;
use crate::records::LanguageCode;
use crate::utils::{Result, WorkflowError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const TO_BE_TRANSLATED: &str = "to_be_translated_";
const AI_TRANSLATED: &str = "ai_translated_";
const TRANSLATION_REVIEWED: &str = "translation_reviewed_";
const APPROVED: &str = "approved_";
const TRANSLATION_REVIEWED_BY: &str = "translation_reviewed_by_";
const APPROVED_BY: &str = "approved_by_";

const FLAG_PREFIXES: [&str; 4] = [TO_BE_TRANSLATED, AI_TRANSLATED, TRANSLATION_REVIEWED, APPROVED];

/// Workflow flags and attribution for one article in one target language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageStatus {
    pub to_be_translated: bool,
    pub ai_translated: bool,
    pub translation_reviewed: bool,
    pub approved: bool,
    pub translation_reviewed_by: String,
    pub approved_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub id: u64,
    pub title: String,
    /// `None` when the backing file has no `content` column.
    pub content: Option<String>,
    pub languages: BTreeMap<LanguageCode, LanguageStatus>,
    /// Columns this tool does not interpret, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl ArticleRecord {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: None,
            languages: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn status(&self, lang: &LanguageCode) -> Option<&LanguageStatus> {
        self.languages.get(lang)
    }

    pub fn status_mut(&mut self, lang: &LanguageCode) -> Option<&mut LanguageStatus> {
        self.languages.get_mut(lang)
    }

    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    fn cells(&self) -> HashMap<String, String> {
        let mut cells = HashMap::new();
        cells.insert("id".to_string(), self.id.to_string());
        cells.insert("title".to_string(), self.title.clone());
        if let Some(content) = &self.content {
            cells.insert("content".to_string(), content.clone());
        }
        for (lang, status) in &self.languages {
            for (column, value) in status_columns(lang, status) {
                cells.insert(column, value);
            }
        }
        for (column, value) in &self.extra {
            cells.insert(column.clone(), value.clone());
        }
        cells
    }
}

fn status_columns(lang: &LanguageCode, status: &LanguageStatus) -> [(String, String); 6] {
    [
        (format!("{TO_BE_TRANSLATED}{lang}"), format_bool(status.to_be_translated)),
        (format!("{AI_TRANSLATED}{lang}"), format_bool(status.ai_translated)),
        (format!("{TRANSLATION_REVIEWED}{lang}"), format_bool(status.translation_reviewed)),
        (format!("{TRANSLATION_REVIEWED_BY}{lang}"), status.translation_reviewed_by.clone()),
        (format!("{APPROVED}{lang}"), format_bool(status.approved)),
        (format!("{APPROVED_BY}{lang}"), status.approved_by.clone()),
    ]
}

pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "1.0" => Ok(true),
        "false" | "0" | "no" | "0.0" | "" => Ok(false),
        other => Err(WorkflowError::MalformedRecord(format!(
            "'{}' is not a boolean",
            other
        ))),
    }
}

/// Flags are always written `True`/`False`, whatever spelling was read.
fn format_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

/// Languages present in a header, discovered from the flag column names.
pub fn discover_languages(headers: &[String]) -> BTreeSet<LanguageCode> {
    headers
        .iter()
        .filter(|h| !h.starts_with(TRANSLATION_REVIEWED_BY) && !h.starts_with(APPROVED_BY))
        .filter_map(|h| {
            FLAG_PREFIXES
                .iter()
                .find_map(|prefix| h.strip_prefix(prefix))
                .and_then(|code| LanguageCode::parse(code).ok())
        })
        .collect()
}

pub fn records_from_table(table: &CsvTable) -> Result<Vec<ArticleRecord>> {
    table.require_column("id")?;
    table.require_column("title")?;
    let has_content = table.column("content").is_some();
    let languages = discover_languages(&table.headers);

    let mut consumed: BTreeSet<String> = ["id", "title", "content"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for lang in &languages {
        for (column, _) in status_columns(lang, &LanguageStatus::default()) {
            consumed.insert(column);
        }
    }

    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(table.rows.len());

    for (line, row) in table.rows.iter().enumerate() {
        let raw_id = table.cell(row, "id").unwrap_or("").trim();
        let id: u64 = raw_id.parse().map_err(|_| {
            WorkflowError::MalformedRecord(format!("row {}: invalid id '{}'", line + 1, raw_id))
        })?;
        if !seen.insert(id) {
            return Err(WorkflowError::MalformedRecord(format!(
                "row {}: duplicate id {}",
                line + 1,
                id
            )));
        }

        let mut record = ArticleRecord::new(id, table.cell(row, "title").unwrap_or(""));
        if has_content {
            record.content = table.cell(row, "content").map(str::to_string);
        }

        for lang in &languages {
            let flag = |prefix: &str| -> Result<bool> {
                parse_bool(table.cell(row, &format!("{prefix}{lang}")).unwrap_or(""))
            };
            let text = |prefix: &str| -> String {
                table
                    .cell(row, &format!("{prefix}{lang}"))
                    .unwrap_or("")
                    .to_string()
            };
            let status = LanguageStatus {
                to_be_translated: flag(TO_BE_TRANSLATED)?,
                ai_translated: flag(AI_TRANSLATED)?,
                translation_reviewed: flag(TRANSLATION_REVIEWED)?,
                approved: flag(APPROVED)?,
                translation_reviewed_by: text(TRANSLATION_REVIEWED_BY),
                approved_by: text(APPROVED_BY),
            };
            record.languages.insert(lang.clone(), status);
        }

        for (idx, header) in table.headers.iter().enumerate() {
            if !consumed.contains(header) {
                let value = row.get(idx).cloned().unwrap_or_default();
                record.extra.insert(header.clone(), value);
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Lays records out under `existing_headers` (when the file already exists),
/// appending any column the records need that the header lacks.
pub fn records_to_table(records: &[ArticleRecord], existing_headers: Option<&[String]>) -> CsvTable {
    let mut headers: Vec<String> = existing_headers.map(|h| h.to_vec()).unwrap_or_default();

    let push = |column: String, headers: &mut Vec<String>| {
        if !headers.contains(&column) {
            headers.push(column);
        }
    };

    push("id".to_string(), &mut headers);
    push("title".to_string(), &mut headers);
    if records.iter().any(|r| r.content.is_some()) {
        push("content".to_string(), &mut headers);
    }
    let languages: BTreeSet<&LanguageCode> =
        records.iter().flat_map(|r| r.languages.keys()).collect();
    for lang in languages {
        for (column, _) in status_columns(lang, &LanguageStatus::default()) {
            push(column, &mut headers);
        }
    }
    for record in records {
        for column in record.extra.keys() {
            push(column.clone(), &mut headers);
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut cells = record.cells();
            headers
                .iter()
                .map(|h| cells.remove(h).unwrap_or_default())
                .collect()
        })
        .collect();

    CsvTable { headers, rows }
}
