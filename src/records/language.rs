use crate::utils::{Result, WorkflowError};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lowercase ISO 639-1 style language code such as `es`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_lowercase();
        let valid = (2..=3).contains(&normalized.len())
            && normalized.bytes().all(|b| b.is_ascii_lowercase());
        if valid {
            Ok(Self(normalized))
        } else {
            Err(WorkflowError::UnknownLanguage(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English display name used in prompts, e.g. `Spanish` for `es`.
    pub fn english_name(&self) -> String {
        let lang = match self.0.len() {
            2 => Language::from_639_1(&self.0),
            _ => Language::from_639_3(&self.0),
        };
        lang.map(|l| l.to_name().to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_normalized() {
        assert_eq!(LanguageCode::parse(" ES ").unwrap().as_str(), "es");
    }

    #[test]
    fn rejects_non_codes() {
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("e").is_err());
        assert!(LanguageCode::parse("es_MX").is_err());
        assert!(LanguageCode::parse("english").is_err());
    }

    #[test]
    fn english_names_for_prompts() {
        assert_eq!(LanguageCode::parse("es").unwrap().english_name(), "Spanish");
        assert_eq!(LanguageCode::parse("fr").unwrap().english_name(), "French");
        assert_eq!(LanguageCode::parse("en").unwrap().english_name(), "English");
    }
}
