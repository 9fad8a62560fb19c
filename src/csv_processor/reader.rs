use crate::utils::{Result, WorkflowError};
use csv::StringRecord;
use std::path::PathBuf;

/// A CSV file read fully into memory: header plus rows of raw cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| WorkflowError::MalformedRecord(format!("missing column '{}'", name)))
    }

    /// Cell by column name; short rows read as empty.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column(name)
            .map(|idx| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

pub struct CsvStreamReader {
    path: PathBuf,
}

impl CsvStreamReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read_headers(&self) -> Result<Vec<String>> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(file);
        Ok(string_record_to_vec(reader.headers()?))
    }

    /// Reads every row; rows may be shorter or longer than the header.
    pub fn read_table(&self) -> Result<CsvTable> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = string_record_to_vec(reader.headers()?);

        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(string_record_to_vec(&result?));
        }
        Ok(CsvTable { headers, rows })
    }
}

pub fn string_record_to_vec(record: &StringRecord) -> Vec<String> {
    record.iter().map(|s| s.to_string()).collect()
}
