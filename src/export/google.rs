use crate::export::auth::GoogleAuth;
use crate::export::store::{DocumentRef, DocumentStore};
use crate::utils::config::GoogleConfig;
use crate::utils::{Result, WorkflowError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DocumentRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

#[derive(Debug, Deserialize)]
struct Parents {
    #[serde(default)]
    parents: Vec<String>,
}

/// Google Drive v3 + Docs v1 over REST.
#[derive(Debug)]
pub struct GoogleDocsStore {
    client: Client,
    auth: GoogleAuth,
    drive_endpoint: String,
    docs_endpoint: String,
}

impl GoogleDocsStore {
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let auth = GoogleAuth::from_file(&config.token_file, client.clone())?;
        Ok(Self {
            client,
            auth,
            drive_endpoint: config.drive_endpoint.trim_end_matches('/').to_string(),
            docs_endpoint: config.docs_endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::ApiError(format!(
                "document store returned {}: {}",
                status, body
            )));
        }
        Ok(response)
    }

    async fn list(&self, query: String) -> Result<Vec<DocumentRef>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.clone()),
                ("fields", "nextPageToken, files(id, name)".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let request = self
                .client
                .get(format!("{}/files", self.drive_endpoint))
                .query(&params);
            let page: FileList = self.send(request).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(query = %query, found = files.len(), "Listed documents");
        Ok(files)
    }

    async fn reparent(&self, document_id: &str, add: &str, remove: &str) -> Result<()> {
        let request = self
            .client
            .patch(format!("{}/files/{}", self.drive_endpoint, document_id))
            .query(&[
                ("addParents", add),
                ("removeParents", remove),
                ("fields", "id, parents"),
            ])
            .json(&json!({}));
        self.send(request).await?;
        Ok(())
    }
}

/// Quotes a value for a Drive query string literal.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl DocumentStore for GoogleDocsStore {
    async fn find_by_name(&self, folder: &str, name: &str) -> Result<Vec<DocumentRef>> {
        let query = format!(
            "'{}' in parents and name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_literal(folder),
            escape_query_literal(name),
            DOCUMENT_MIME
        );
        let found = self.list(query).await?;
        Ok(found.into_iter().filter(|d| d.name == name).collect())
    }

    async fn search_by_name(&self, folder: &str, fragment: &str) -> Result<Vec<DocumentRef>> {
        let query = format!(
            "name contains '{}' and mimeType = '{}' and '{}' in parents and trashed = false",
            escape_query_literal(fragment),
            DOCUMENT_MIME,
            escape_query_literal(folder)
        );
        self.list(query).await
    }

    async fn create_document(&self, folder: &str, title: &str, content: &str) -> Result<DocumentRef> {
        let request = self
            .client
            .post(format!("{}/documents", self.docs_endpoint))
            .json(&json!({ "title": title }));
        let created: CreatedDocument = self.send(request).await?.json().await?;
        let document_id = created.document_id;

        let request = self
            .client
            .get(format!("{}/files/{}", self.drive_endpoint, document_id))
            .query(&[("fields", "parents")]);
        let current: Parents = self.send(request).await?.json().await?;
        self.reparent(&document_id, folder, &current.parents.join(","))
            .await?;

        if !content.is_empty() {
            let request = self
                .client
                .post(format!(
                    "{}/documents/{}:batchUpdate",
                    self.docs_endpoint, document_id
                ))
                .json(&json!({
                    "requests": [
                        { "insertText": { "location": { "index": 1 }, "text": content } }
                    ]
                }));
            self.send(request).await?;
        }

        info!(document_id = %document_id, title = %title, folder = %folder, "Document created");
        Ok(DocumentRef {
            id: document_id,
            name: title.to_string(),
        })
    }

    async fn move_document(&self, document_id: &str, from: &str, to: &str) -> Result<()> {
        self.reparent(document_id, to, from).await?;
        info!(document_id = %document_id, from = %from, to = %to, "Document moved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_literals_escape_quotes_and_backslashes() {
        assert_eq!(escape_query_literal("7_L'été"), "7_L\\'été");
        assert_eq!(escape_query_literal(r"a\b"), r"a\\b");
    }

    #[test]
    fn file_list_tolerates_missing_files_key() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
        assert!(list.next_page_token.is_none());

        let list: FileList = serde_json::from_str(
            r#"{"nextPageToken":"abc","files":[{"id":"1","name":"7_Titre"}]}"#,
        )
        .unwrap();
        assert_eq!(list.files[0].name, "7_Titre");
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
    }
}
