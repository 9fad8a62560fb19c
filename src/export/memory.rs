use crate::export::store::{DocumentRef, DocumentStore};
use crate::utils::{Result, WorkflowError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub name: String,
    pub content: String,
    pub parents: BTreeSet<String>,
}

/// Document store kept in memory, for tests and offline runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Mutex<BTreeMap<String, StoredDocument>>,
    next_id: Mutex<u64>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails while set, as if the remote service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Files a document directly, bypassing the create path.
    pub fn insert(&self, folder: &str, name: &str, content: &str) -> String {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            format!("doc-{}", *next)
        };
        self.documents.lock().insert(
            id.clone(),
            StoredDocument {
                id: id.clone(),
                name: name.to_string(),
                content: content.to_string(),
                parents: BTreeSet::from([folder.to_string()]),
            },
        );
        id
    }

    /// Names of the documents in `folder`, sorted.
    pub fn names_in(&self, folder: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .documents
            .lock()
            .values()
            .filter(|d| d.parents.contains(folder))
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn document(&self, id: &str) -> Option<StoredDocument> {
        self.documents.lock().get(id).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WorkflowError::ApiError(
                "document store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn matching(&self, folder: &str, predicate: impl Fn(&str) -> bool) -> Vec<DocumentRef> {
        self.documents
            .lock()
            .values()
            .filter(|d| d.parents.contains(folder) && predicate(&d.name))
            .map(|d| DocumentRef {
                id: d.id.clone(),
                name: d.name.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_by_name(&self, folder: &str, name: &str) -> Result<Vec<DocumentRef>> {
        self.check_available()?;
        Ok(self.matching(folder, |n| n == name))
    }

    async fn search_by_name(&self, folder: &str, fragment: &str) -> Result<Vec<DocumentRef>> {
        self.check_available()?;
        Ok(self.matching(folder, |n| n.contains(fragment)))
    }

    async fn create_document(&self, folder: &str, title: &str, content: &str) -> Result<DocumentRef> {
        self.check_available()?;
        let id = self.insert(folder, title, content);
        Ok(DocumentRef {
            id,
            name: title.to_string(),
        })
    }

    async fn move_document(&self, document_id: &str, from: &str, to: &str) -> Result<()> {
        self.check_available()?;
        let mut documents = self.documents.lock();
        let document = documents.get_mut(document_id).ok_or_else(|| {
            WorkflowError::ApiError(format!("document {} not found", document_id))
        })?;
        document.parents.remove(from);
        document.parents.insert(to.to_string());
        Ok(())
    }
}
