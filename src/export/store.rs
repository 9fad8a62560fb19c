use crate::utils::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

/// A document as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
}

/// Folder-structured document storage. Folder membership is multi-valued:
/// moving a document adds one parent and removes another.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Documents in `folder` whose name equals `name` exactly.
    async fn find_by_name(&self, folder: &str, name: &str) -> Result<Vec<DocumentRef>>;

    /// Documents in `folder` whose name contains `fragment`. Callers filter
    /// further; stores may match loosely.
    async fn search_by_name(&self, folder: &str, fragment: &str) -> Result<Vec<DocumentRef>>;

    /// Creates a document titled `title` with body `content`, filed only in `folder`.
    async fn create_document(&self, folder: &str, title: &str, content: &str) -> Result<DocumentRef>;

    async fn move_document(&self, document_id: &str, from: &str, to: &str) -> Result<()>;
}
