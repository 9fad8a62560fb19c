/*!
 * Mock completion provider for tests and dry runs.
 *
 * - `MockProvider::working()` answers every request
 * - `MockProvider::failing_on(n)` fails the n-th request (1-based)
 * - `MockProvider::failing()` fails every request
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::translation::client::{CompletionProvider, CompletionRequest};
use crate::utils::{Result, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Working,
    FailOn(usize),
    Failing,
}

#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing_on(call: usize) -> Self {
        Self::new(MockBehavior::FailOn(call))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The text the mock returns for `original`.
    pub fn translation_of(original: &str) -> String {
        format!("[translated] {}", original)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let original = request
            .user
            .split_once("Original article:\n")
            .map(|(_, text)| text.strip_suffix('\n').unwrap_or(text).to_string())
            .unwrap_or_else(|| request.user.clone());
        self.requests.lock().push(request);

        match self.behavior {
            MockBehavior::Failing => Err(WorkflowError::ApiError("mock failure".to_string())),
            MockBehavior::FailOn(n) if n == call => Err(WorkflowError::ApiError(format!(
                "mock failure on call {}",
                call
            ))),
            _ => Ok(Self::translation_of(&original)),
        }
    }
}
