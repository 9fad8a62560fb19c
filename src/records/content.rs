use crate::csv_processor::{write_table, CsvStreamReader};
use crate::records::{ArticleRecord, LanguageCode};
use crate::utils::{Result, WorkflowError};
use std::path::{Path, PathBuf};

/// One row of article text: `id` plus named text fields in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRow {
    pub id: u64,
    fields: Vec<(String, String)>,
}

impl ContentRow {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn from_article(article: &ArticleRecord) -> Self {
        Self::new(article.id)
            .with("title", article.title.clone())
            .with("content", article.content_text())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn title(&self) -> &str {
        self.get("title").unwrap_or("")
    }

    pub fn content(&self) -> &str {
        self.get("content").unwrap_or("")
    }

    /// `title_es` for field `title` and language `es`.
    pub fn translated(&self, field: &str, lang: &LanguageCode) -> Option<&str> {
        self.get(&translated_field(field, lang))
    }
}

pub fn translated_field(field: &str, lang: &LanguageCode) -> String {
    format!("{}_{}", field, lang)
}

/// The companion content file (`posts.csv`) holding article text.
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file reads as empty.
    pub fn load(&self) -> Result<Vec<ContentRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_content_rows(&self.path)
    }

    pub fn write(&self, rows: &[ContentRow]) -> Result<usize> {
        write_content_rows(&self.path, rows)
    }
}

pub fn read_content_rows(path: &Path) -> Result<Vec<ContentRow>> {
    let table = CsvStreamReader::new(path).read_table()?;
    let id_column = table.require_column("id")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(line, row)| {
            let raw_id = row.get(id_column).map(|s| s.trim()).unwrap_or("");
            let id = raw_id.parse().map_err(|_| {
                WorkflowError::MalformedRecord(format!(
                    "{} row {}: invalid id '{}'",
                    path.display(),
                    line + 1,
                    raw_id
                ))
            })?;
            let mut content = ContentRow::new(id);
            for (idx, header) in table.headers.iter().enumerate() {
                if idx != id_column {
                    content.set(header, row.get(idx).cloned().unwrap_or_default());
                }
            }
            Ok(content)
        })
        .collect()
}

/// Columns are `id` followed by every field in first-seen order.
pub fn write_content_rows(path: &Path, rows: &[ContentRow]) -> Result<usize> {
    let mut headers = vec!["id".to_string()];
    for row in rows {
        for name in row.field_names() {
            if !headers.iter().any(|h| h == name) {
                headers.push(name.to_string());
            }
        }
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| {
                    if h == "id" {
                        row.id.to_string()
                    } else {
                        row.get(h).unwrap_or("").to_string()
                    }
                })
                .collect()
        })
        .collect();

    write_table(path, headers, &cells)
}
