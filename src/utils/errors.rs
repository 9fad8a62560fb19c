use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] tokio_postgres::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed record store: {0}")]
    MalformedRecord(String),

    #[error("Unknown user: {0}")]
    AuthenticationFailed(String),

    #[error("Role {role} may not {action}")]
    Unauthorized { role: String, action: String },

    #[error("Article not found: {0}")]
    NotFound(u64),

    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("No folder routing configured for language: {0}")]
    UnroutedLanguage(String),

    #[error("Article {id} cannot {transition} in {lang}: currently {stage}")]
    InvalidTransition {
        id: u64,
        lang: String,
        stage: String,
        transition: String,
    },

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Document store authorization error: {0}")]
    AuthError(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

impl WorkflowError {
    /// Wraps any document store failure so the batch reports it as an export failure.
    pub fn into_export_failure(self) -> Self {
        match self {
            e @ (WorkflowError::ExportFailed(_) | WorkflowError::UnroutedLanguage(_)) => e,
            other => WorkflowError::ExportFailed(other.to_string()),
        }
    }

    pub fn into_translation_failure(self) -> Self {
        match self {
            e @ WorkflowError::TranslationFailed(_) => e,
            other => WorkflowError::TranslationFailed(other.to_string()),
        }
    }
}
