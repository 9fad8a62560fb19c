use crate::utils::{sanitize_cell, Result, WorkflowError};
use csv::Writer;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes a CSV into a temp file beside the target and renames it into place
/// on `finish`, so readers never observe a half-written file.
pub struct CsvStreamWriter {
    path: PathBuf,
    headers: Vec<String>,
    sanitize: bool,
    writer: Option<Writer<NamedTempFile>>,
    rows_written: usize,
}

impl CsvStreamWriter {
    pub fn new(path: impl Into<PathBuf>, headers: Vec<String>) -> Self {
        Self {
            path: path.into(),
            headers,
            sanitize: false,
            writer: None,
            rows_written: 0,
        }
    }

    /// Quote formula-looking cells. Meant for artifacts opened in a
    /// spreadsheet, not for the record store itself.
    pub fn sanitized(mut self) -> Self {
        self.sanitize = true;
        self
    }

    pub fn initialize(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file = NamedTempFile::new_in(&dir)?;
        let mut writer = Writer::from_writer(file);
        writer.write_record(&self.headers)?;
        self.writer = Some(writer);
        Ok(())
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            WorkflowError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Writer not initialized",
            ))
        })?;

        if self.sanitize {
            let sanitized: Vec<String> = row.iter().map(|s| sanitize_cell(s)).collect();
            writer.write_record(&sanitized)?;
        } else {
            writer.write_record(row)?;
        }
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize> {
        let writer = self.writer.take().ok_or_else(|| {
            WorkflowError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Writer not initialized",
            ))
        })?;

        let file = writer
            .into_inner()
            .map_err(|e| {
                WorkflowError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
            })?;
        file.as_file().sync_all()?;
        file.persist(&self.path)
            .map_err(|e| WorkflowError::IoError(e.error))?;

        Ok(self.rows_written)
    }

}

/// Writes a whole table in one go.
pub fn write_table(path: &Path, headers: Vec<String>, rows: &[Vec<String>]) -> Result<usize> {
    let mut writer = CsvStreamWriter::new(path, headers);
    writer.initialize()?;
    writer.write_rows(rows)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_processor::CsvStreamReader;

    #[test]
    fn finish_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale\n").unwrap();

        let written = write_table(
            &path,
            vec!["id".into(), "title".into()],
            &[vec!["1".into(), "Uno".into()]],
        )
        .unwrap();
        assert_eq!(written, 1);

        let table = CsvStreamReader::new(&path).read_table().unwrap();
        assert_eq!(table.headers, vec!["id", "title"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "Uno".to_string()]]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unfinished_writer_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "id\n1\n").unwrap();

        let mut writer = CsvStreamWriter::new(&path, vec!["id".into()]);
        writer.initialize().unwrap();
        writer.write_row(&["2".to_string()]).unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\n1\n");
    }

    #[test]
    fn sanitized_writer_quotes_formulas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.csv");

        let mut writer = CsvStreamWriter::new(&path, vec!["title".into()]).sanitized();
        writer.initialize().unwrap();
        writer.write_row(&["=HYPERLINK(x)".to_string()]).unwrap();
        writer.finish().unwrap();

        let table = CsvStreamReader::new(&path).read_table().unwrap();
        assert_eq!(table.rows[0][0], "'=HYPERLINK(x)");
    }
}
