use crate::csv_processor::CsvStreamReader;
use crate::records::LanguageCode;
use crate::utils::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Translator,
    Reviewer,
    Approver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Translator => "translator",
            Role::Reviewer => "reviewer",
            Role::Approver => "approver",
        }
    }

    /// `self` may act where `required` is expected; admin may act anywhere.
    pub fn acts_as(&self, required: Role) -> bool {
        *self == required || *self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "translator" => Ok(Role::Translator),
            "reviewer" => Ok(Role::Reviewer),
            "approver" => Ok(Role::Approver),
            other => Err(WorkflowError::MalformedRecord(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    pub lang: LanguageCode,
}

/// The `username,role,lang` table. Read on every lookup so edits to the file
/// apply without a restart.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    path: PathBuf,
}

impl UserDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn find(&self, username: &str) -> Result<Option<User>> {
        let table = CsvStreamReader::new(&self.path).read_table()?;
        table.require_column("username")?;
        table.require_column("role")?;

        let Some(row) = table
            .rows
            .iter()
            .find(|row| table.cell(row, "username") == Some(username))
        else {
            return Ok(None);
        };

        let role: Role = table.cell(row, "role").unwrap_or("").parse()?;
        let lang = match table.cell(row, "lang").map(str::trim) {
            Some(code) if !code.is_empty() => LanguageCode::parse(code)?,
            _ => LanguageCode::parse("en")?,
        };

        Ok(Some(User {
            username: username.to_string(),
            role,
            lang,
        }))
    }

    pub fn authenticate(&self, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(WorkflowError::AuthenticationFailed(String::new()));
        }
        self.find(username)?
            .ok_or_else(|| WorkflowError::AuthenticationFailed(username.to_string()))
    }
}
