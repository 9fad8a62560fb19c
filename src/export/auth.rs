use crate::utils::{Result, WorkflowError};
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The authorized-user token file written by Google's installed-app OAuth
/// flow (`token.json`). Unknown keys are carried through on rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

impl AuthorizedUser {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::AuthError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// True when there is no access token or it expires within a minute.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return true;
        }
        match self.expiry.as_deref().map(DateTime::parse_from_rfc3339) {
            Some(Ok(expiry)) => expiry.with_timezone(&Utc) <= now + ChronoDuration::seconds(60),
            Some(Err(_)) => true,
            None => false,
        }
    }

    fn apply_refresh(&mut self, response: RefreshResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        let expiry = now + ChronoDuration::seconds(response.expires_in);
        self.expiry = Some(expiry.to_rfc3339_opts(SecondsFormat::Micros, true));
    }
}

/// Hands out a valid access token, refreshing and persisting it as needed.
#[derive(Debug)]
pub struct GoogleAuth {
    path: PathBuf,
    client: Client,
    credentials: Mutex<AuthorizedUser>,
}

impl GoogleAuth {
    pub fn from_file(path: impl Into<PathBuf>, client: Client) -> Result<Self> {
        let path = path.into();
        let credentials = AuthorizedUser::load(&path)?;
        Ok(Self {
            path,
            client,
            credentials: Mutex::new(credentials),
        })
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut credentials = self.credentials.lock().await;
        let now = Utc::now();

        if credentials.needs_refresh(now) {
            let params = [
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ];
            let response = self
                .client
                .post(&credentials.token_uri)
                .form(&params)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(WorkflowError::AuthError(format!(
                    "token refresh returned {}: {}",
                    status, body
                )));
            }

            let refreshed: RefreshResponse = response.json().await?;
            credentials.apply_refresh(refreshed, now);
            credentials.save(&self.path)?;
            info!(path = %self.path.display(), "Refreshed document store access token");
        }

        credentials
            .token
            .clone()
            .ok_or_else(|| WorkflowError::AuthError("no access token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_JSON: &str = r#"{
        "token": "ya29.old",
        "refresh_token": "1//refresh",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "client.apps.googleusercontent.com",
        "client_secret": "secret",
        "scopes": ["https://www.googleapis.com/auth/drive"],
        "expiry": "2024-10-16T12:00:00.000000Z"
    }"#;

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parses_python_token_file_and_keeps_extra_keys() {
        let user: AuthorizedUser = serde_json::from_str(TOKEN_JSON).unwrap();
        assert_eq!(user.refresh_token, "1//refresh");
        assert!(user.extra.contains_key("scopes"));

        let rewritten = serde_json::to_value(&user).unwrap();
        assert_eq!(rewritten["scopes"][0], "https://www.googleapis.com/auth/drive");
    }

    #[test]
    fn refresh_needed_near_expiry() {
        let user: AuthorizedUser = serde_json::from_str(TOKEN_JSON).unwrap();
        assert!(!user.needs_refresh(at("2024-10-16T11:00:00Z")));
        assert!(user.needs_refresh(at("2024-10-16T11:59:30Z")));
        assert!(user.needs_refresh(at("2024-10-17T00:00:00Z")));
    }

    #[test]
    fn missing_token_needs_refresh() {
        let mut user: AuthorizedUser = serde_json::from_str(TOKEN_JSON).unwrap();
        user.token = None;
        assert!(user.needs_refresh(at("2024-10-16T11:00:00Z")));
    }

    #[test]
    fn applied_refresh_sets_new_expiry() {
        let mut user: AuthorizedUser = serde_json::from_str(TOKEN_JSON).unwrap();
        let now = at("2024-10-16T12:30:00Z");
        user.apply_refresh(
            RefreshResponse {
                access_token: "ya29.new".to_string(),
                expires_in: 3599,
            },
            now,
        );
        assert_eq!(user.token.as_deref(), Some("ya29.new"));
        assert!(!user.needs_refresh(now));
        assert_eq!(user.expiry.as_deref(), Some("2024-10-16T13:29:59.000000Z"));
    }
}
