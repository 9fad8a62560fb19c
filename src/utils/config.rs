use crate::records::LanguageCode;
use crate::utils::errors::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub translation: TranslationDefaults,
    pub google: GoogleConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub articles_file: PathBuf,
    pub users_file: PathBuf,
    pub content_file: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationDefaults {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub source_lang: String,
    pub fields: Vec<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub token_file: PathBuf,
    pub drive_endpoint: String,
    pub docs_endpoint: String,
    pub timeout_seconds: u64,
    pub folders: BTreeMap<String, FolderRoute>,
}

/// Where documents for one language live while awaiting review, and where
/// they go once reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRoute {
    pub staging: String,
    pub reviewed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub languages: Vec<String>,
    /// Reject transitions whose previous stage is not complete.
    pub strict_transitions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            translation: TranslationDefaults::default(),
            google: GoogleConfig::default(),
            workflow: WorkflowConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "translation-review".to_string(),
            bind: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            articles_file: PathBuf::from("./data/translation_followup.csv"),
            users_file: PathBuf::from("./data/users.csv"),
            content_file: PathBuf::from("./data/posts.csv"),
            output_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for TranslationDefaults {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            source_lang: "fr".to_string(),
            fields: vec!["title".to_string(), "content".to_string()],
            temperature: 0.0,
            max_tokens: 4000,
            timeout_seconds: 120,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from("./token.json"),
            drive_endpoint: "https://www.googleapis.com/drive/v3".to_string(),
            docs_endpoint: "https://docs.googleapis.com/v1".to_string(),
            timeout_seconds: 60,
            folders: BTreeMap::new(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "es".to_string()],
            strict_transitions: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkflowError::ConfigError(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| WorkflowError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load_from_file(p),
            _ => Ok(Self::default()),
        }
    }

    /// Checks every configured language code and its folder routing.
    pub fn validate(&self) -> Result<()> {
        self.languages()?;
        self.folder_routes()?;
        LanguageCode::parse(&self.translation.source_lang)?;
        if self.translation.fields.is_empty() {
            return Err(WorkflowError::ConfigError(
                "translation.fields must name at least one column".to_string(),
            ));
        }
        Ok(())
    }

    pub fn languages(&self) -> Result<Vec<LanguageCode>> {
        if self.workflow.languages.is_empty() {
            return Err(WorkflowError::ConfigError(
                "workflow.languages is empty".to_string(),
            ));
        }
        self.workflow
            .languages
            .iter()
            .map(|code| LanguageCode::parse(code))
            .collect()
    }

    /// Folder routing for every configured language. A configured language
    /// without a route is a startup error.
    pub fn folder_routes(&self) -> Result<BTreeMap<LanguageCode, FolderRoute>> {
        let mut routes = BTreeMap::new();
        for lang in self.languages()? {
            let route = self
                .google
                .folders
                .get(lang.as_str())
                .ok_or_else(|| WorkflowError::UnroutedLanguage(lang.to_string()))?;
            if route.staging.is_empty() || route.reviewed.is_empty() {
                return Err(WorkflowError::ConfigError(format!(
                    "google.folders.{} needs both staging and reviewed folder ids",
                    lang
                )));
            }
            routes.insert(lang, route.clone());
        }
        Ok(routes)
    }
}
