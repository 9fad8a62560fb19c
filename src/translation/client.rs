use crate::utils::config::TranslationDefaults;
use crate::utils::{Result, WorkflowError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// One chat-completion call: a system instruction plus a user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Returns the completion text, trimmed.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client.
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &TranslationDefaults) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            WorkflowError::ConfigError(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::ApiError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;
        extract_text(chat)
    }
}

fn extract_text(chat: ChatResponse) -> Result<String> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| WorkflowError::ApiError("No text content in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![Message {
                role: "user",
                content: "Hola",
            }],
            max_tokens: 4000,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 4000);
    }

    #[test]
    fn first_choice_is_trimmed() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Hola mundo\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(chat).unwrap(), "Hola mundo");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let chat: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_text(chat), Err(WorkflowError::ApiError(_))));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let config = TranslationDefaults {
            api_key_env: "TRANSLATION_REVIEW_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiClient::from_config(&config),
            Err(WorkflowError::ConfigError(_))
        ));
    }
}
