//! Shared fixture: temp CSV files, the mock provider and the in-memory
//! document store wired into a workflow service.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use translation_review::records::LanguageCode;
use translation_review::translation::TranslationGateway;
use translation_review::utils::FolderRoute;
use translation_review::{AppConfig, DocumentExporter, InMemoryStore, MockProvider, WorkflowService};

pub const ARTICLES: &str = "\
id,title,content,to_be_translated_es,ai_translated_es,translation_reviewed_es,translation_reviewed_by_es,approved_es,approved_by_es,owner
7,Le vin,,True,False,False,,False,,cintia
8,La mer,,True,False,False,,False,,maria
9,Le pain,,False,True,False,,False,,maria
";

pub const USERS: &str = "\
username,role,lang
maria,translator,es
rosa,reviewer,es
ana,approver,es
root,admin,es
";

pub const POSTS: &str = "\
id,title,content
7,Le vin,Le raisin fermente.
8,La mer,Le sel et le vent.
";

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub config: AppConfig,
    pub provider: Arc<MockProvider>,
    pub store: Arc<InMemoryStore>,
    pub service: WorkflowService,
}

pub fn es() -> LanguageCode {
    LanguageCode::parse("es").unwrap()
}

pub fn fixture_with(provider: MockProvider, strict: bool) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("articles.csv"), ARTICLES).unwrap();
    std::fs::write(dir.path().join("users.csv"), USERS).unwrap();
    std::fs::write(dir.path().join("posts.csv"), POSTS).unwrap();

    let mut config = AppConfig::default();
    config.data.articles_file = dir.path().join("articles.csv");
    config.data.users_file = dir.path().join("users.csv");
    config.data.content_file = dir.path().join("posts.csv");
    config.data.output_dir = dir.path().join("out");
    config.workflow.languages = vec!["es".to_string()];
    config.workflow.strict_transitions = strict;

    let provider = Arc::new(provider);
    let store = Arc::new(InMemoryStore::new());
    let routes = BTreeMap::from([(
        es(),
        FolderRoute {
            staging: "staging-es".to_string(),
            reviewed: "reviewed-es".to_string(),
        },
    )]);
    let service = WorkflowService::new(
        &config,
        TranslationGateway::new(provider.clone()),
        DocumentExporter::new(store.clone(), routes),
    )
    .unwrap();

    Fixture {
        dir,
        config,
        provider,
        store,
        service,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(MockProvider::working(), true)
}

