//! Document export: files article text into per-language folders of a
//! document store and routes reviewed documents onward.

pub mod auth;
pub mod google;
pub mod memory;
pub mod store;

pub use google::GoogleDocsStore;
pub use memory::InMemoryStore;
pub use store::{DocumentRef, DocumentStore};

use crate::records::{translated_field, ContentRow, LanguageCode};
use crate::utils::{FolderRoute, Result, WorkflowError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub created: usize,
    pub skipped: usize,
}

/// `"{id}_{title}"`, the naming scheme that ties documents to articles.
pub fn document_title(id: u64, title: &str) -> String {
    format!("{}_{}", id, title)
}

#[derive(Debug, Clone)]
pub struct DocumentExporter {
    store: Arc<dyn DocumentStore>,
    routes: BTreeMap<LanguageCode, FolderRoute>,
}

impl DocumentExporter {
    pub fn new(store: Arc<dyn DocumentStore>, routes: BTreeMap<LanguageCode, FolderRoute>) -> Self {
        Self { store, routes }
    }

    pub fn route(&self, lang: &LanguageCode) -> Result<&FolderRoute> {
        self.routes
            .get(lang)
            .ok_or_else(|| WorkflowError::UnroutedLanguage(lang.to_string()))
    }

    /// Files the original and the translated version of every row into the
    /// language's staging folder. Titles already present are skipped.
    pub async fn export_records(&self, rows: &[ContentRow], lang: &LanguageCode) -> Result<ExportReport> {
        let folder = self.route(lang)?.staging.clone();
        let title_field = translated_field("title", lang);
        let content_field = translated_field("content", lang);
        let mut report = ExportReport::default();

        for row in rows {
            let translated_title = row.get(&title_field).ok_or_else(|| {
                WorkflowError::ExportFailed(format!("article {} has no {}", row.id, title_field))
            })?;
            let translated_content = row.get(&content_field).unwrap_or("");

            let documents = [
                (document_title(row.id, row.title()), row.content()),
                (document_title(row.id, translated_title), translated_content),
            ];
            for (title, content) in documents {
                if self.create_if_absent(&folder, &title, content).await? {
                    report.created += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }

        info!(
            lang = %lang,
            created = report.created,
            skipped = report.skipped,
            "Export completed"
        );
        Ok(report)
    }

    async fn create_if_absent(&self, folder: &str, title: &str, content: &str) -> Result<bool> {
        let existing = self
            .store
            .find_by_name(folder, title)
            .await
            .map_err(WorkflowError::into_export_failure)?;
        if !existing.is_empty() {
            debug!(title = %title, "Document already exists, not created");
            return Ok(false);
        }
        self.store
            .create_document(folder, title, content)
            .await
            .map_err(WorkflowError::into_export_failure)?;
        Ok(true)
    }

    /// Moves every staging document titled `"{id}_..."` to the reviewed
    /// folder. Returns how many moved; zero when nothing matched.
    pub async fn move_by_doc_id(&self, id: u64, lang: &LanguageCode) -> Result<usize> {
        let route = self.route(lang)?;
        let prefix = format!("{}_", id);

        let matches: Vec<DocumentRef> = self
            .store
            .search_by_name(&route.staging, &prefix)
            .await
            .map_err(WorkflowError::into_export_failure)?
            .into_iter()
            .filter(|d| d.name.starts_with(&prefix))
            .collect();

        if matches.is_empty() {
            info!(article_id = id, folder = %route.staging, "No documents found for article");
            return Ok(0);
        }

        for document in &matches {
            self.store
                .move_document(&document.id, &route.staging, &route.reviewed)
                .await
                .map_err(WorkflowError::into_export_failure)?;
        }
        info!(article_id = id, moved = matches.len(), to = %route.reviewed, "Documents moved");
        Ok(matches.len())
    }
}
