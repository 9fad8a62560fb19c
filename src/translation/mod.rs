pub mod client;
pub mod context;
pub mod mock;

pub use client::{CompletionProvider, CompletionRequest, OpenAiClient};
pub use context::TranslationContext;
pub use mock::{MockBehavior, MockProvider};

use crate::records::{translated_field, ContentRow};
use crate::utils::{Result, WorkflowError};
use std::sync::Arc;
use tracing::{debug, info};

/// Translates text fields of content rows through a completion provider.
#[derive(Debug, Clone)]
pub struct TranslationGateway {
    provider: Arc<dyn CompletionProvider>,
}

impl TranslationGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Returns copies of `rows` with `<field>_<target>` set for each field.
    ///
    /// One request per row and field, issued in order. The first failure
    /// aborts the batch with `TranslationFailed` and nothing is returned.
    pub async fn translate(
        &self,
        rows: &[ContentRow],
        fields: &[String],
        context: &TranslationContext,
    ) -> Result<Vec<ContentRow>> {
        let mut translated = Vec::with_capacity(rows.len());

        for row in rows {
            let mut out = row.clone();
            for field in fields {
                let text = row.get(field).ok_or_else(|| {
                    WorkflowError::TranslationFailed(format!(
                        "article {} has no '{}' field",
                        row.id, field
                    ))
                })?;

                let result = self
                    .provider
                    .complete(context.request(text))
                    .await
                    .map_err(|e| {
                        WorkflowError::TranslationFailed(format!("article {}: {}", row.id, e))
                    })?;

                debug!(article_id = row.id, field = %field, chars = result.len(), "Field translated");
                out.set(&translated_field(field, &context.target), result);
            }
            translated.push(out);
        }

        info!(
            rows = translated.len(),
            source = %context.source,
            target = %context.target,
            "Translation batch completed"
        );
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LanguageCode;

    fn context() -> TranslationContext {
        TranslationContext::new(
            LanguageCode::parse("fr").unwrap(),
            LanguageCode::parse("es").unwrap(),
        )
    }

    fn rows() -> Vec<ContentRow> {
        vec![
            ContentRow::new(7).with("title", "Titre").with("content", "Corps"),
            ContentRow::new(8).with("title", "Autre").with("content", "Texte"),
        ]
    }

    fn fields() -> Vec<String> {
        vec!["title".to_string(), "content".to_string()]
    }

    #[tokio::test]
    async fn populates_target_fields_for_every_row() {
        let provider = Arc::new(MockProvider::working());
        let gateway = TranslationGateway::new(provider.clone());

        let out = gateway.translate(&rows(), &fields(), &context()).await.unwrap();

        assert_eq!(provider.calls(), 4);
        assert_eq!(out[0].get("title_es"), Some("[translated] Titre"));
        assert_eq!(out[1].get("content_es"), Some("[translated] Texte"));
        assert_eq!(out[0].get("title"), Some("Titre"));
    }

    #[tokio::test]
    async fn first_failure_aborts_the_batch() {
        let provider = Arc::new(MockProvider::failing_on(2));
        let gateway = TranslationGateway::new(provider.clone());

        let err = gateway.translate(&rows(), &fields(), &context()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::TranslationFailed(ref m) if m.contains("article 7")));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn missing_field_is_a_translation_failure() {
        let gateway = TranslationGateway::new(Arc::new(MockProvider::working()));
        let rows = vec![ContentRow::new(1).with("title", "Seul")];

        let err = gateway.translate(&rows, &fields(), &context()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::TranslationFailed(_)));
    }
}
