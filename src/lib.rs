pub mod cli;
pub mod csv_processor;
pub mod database;
pub mod export;
pub mod records;
pub mod server;
pub mod state;
pub mod translation;
pub mod utils;
pub mod workflow;

pub use csv_processor::{CsvStreamReader, CsvStreamWriter, CsvTable};
pub use export::{DocumentExporter, DocumentStore, GoogleDocsStore, InMemoryStore};
pub use records::{ArticleRecord, LanguageCode, LanguageStatus, RecordStore, Role, User};
pub use server::create_router;
pub use state::{AppState, SessionStore};
pub use translation::{CompletionProvider, MockProvider, OpenAiClient, TranslationGateway};
pub use utils::{AppConfig, Result, WorkflowError};
pub use workflow::{Stage, Transition, WorkflowService};
