pub mod config;
pub mod errors;

pub use config::{AppConfig, FolderRoute};
pub use errors::{Result, WorkflowError};

/// Neutralizes cells a spreadsheet would evaluate as a formula.
pub fn sanitize_cell(value: &str) -> String {
    if value.starts_with('=')
        || value.starts_with('+')
        || value.starts_with('-')
        || value.starts_with('@')
    {
        format!("'{}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_cell;

    #[test]
    fn formula_cells_are_quoted() {
        assert_eq!(sanitize_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_cell("@cmd"), "'@cmd");
        assert_eq!(sanitize_cell("Hola mundo"), "Hola mundo");
    }
}
