use crate::csv_processor::CsvStreamWriter;
use crate::export::{DocumentExporter, ExportReport, GoogleDocsStore};
use crate::records::{
    filter_queue, ArticleRecord, ContentRow, ContentStore, LanguageCode, RecordStore, Role, User,
    UserDirectory,
};
use crate::translation::{OpenAiClient, TranslationContext, TranslationGateway};
use crate::utils::config::TranslationDefaults;
use crate::utils::{AppConfig, Result, WorkflowError};
use crate::workflow::stage::{apply_transition, check_transition, Transition};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct TranslateOutcome {
    pub translated: Vec<u64>,
    pub artifact: PathBuf,
    pub created_documents: usize,
    pub skipped_documents: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewOutcome {
    pub reviewed: Vec<u64>,
    pub moved_documents: usize,
    /// Ids with nothing in the staging folder. They stay unreviewed.
    pub without_documents: Vec<u64>,
}

/// Runs the translate, review and approve batches against the record store
/// and both gateways.
#[derive(Debug)]
pub struct WorkflowService {
    records: RecordStore,
    users: UserDirectory,
    content: ContentStore,
    translator: TranslationGateway,
    exporter: DocumentExporter,
    languages: Vec<LanguageCode>,
    source_lang: LanguageCode,
    translation: TranslationDefaults,
    output_dir: PathBuf,
    strict: bool,
}

impl WorkflowService {
    pub fn new(
        config: &AppConfig,
        translator: TranslationGateway,
        exporter: DocumentExporter,
    ) -> Result<Self> {
        Ok(Self {
            records: RecordStore::new(&config.data.articles_file),
            users: UserDirectory::new(&config.data.users_file),
            content: ContentStore::new(&config.data.content_file),
            translator,
            exporter,
            languages: config.languages()?,
            source_lang: LanguageCode::parse(&config.translation.source_lang)?,
            translation: config.translation.clone(),
            output_dir: config.data.output_dir.clone(),
            strict: config.workflow.strict_transitions,
        })
    }

    /// Wires the OpenAI-compatible provider and the Google document store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = OpenAiClient::from_config(&config.translation)?;
        let store = GoogleDocsStore::from_config(&config.google)?;
        info!(
            model = provider.model(),
            token_file = %config.google.token_file.display(),
            "Gateways configured"
        );
        Self::new(
            config,
            TranslationGateway::new(Arc::new(provider)),
            DocumentExporter::new(Arc::new(store), config.folder_routes()?),
        )
    }

    pub fn strict_transitions(&self) -> bool {
        self.strict
    }

    pub fn languages(&self) -> &[LanguageCode] {
        &self.languages
    }

    pub fn authenticate(&self, username: &str) -> Result<User> {
        let user = self.users.authenticate(username)?;
        info!(username = %user.username, role = %user.role, "User logged in");
        Ok(user)
    }

    /// Parses `code` and checks that it is one of the configured languages.
    pub fn language(&self, code: &str) -> Result<LanguageCode> {
        let lang = LanguageCode::parse(code)?;
        if !self.languages.contains(&lang) {
            return Err(WorkflowError::UnroutedLanguage(lang.to_string()));
        }
        Ok(lang)
    }

    pub fn queue(&self, role: Role, lang: &LanguageCode) -> Result<Vec<ArticleRecord>> {
        Ok(filter_queue(&self.records.load()?, role, lang))
    }

    pub fn article(&self, id: u64) -> Result<ArticleRecord> {
        self.records.find_by_id(id)
    }

    fn authorize(&self, actor: &User, transition: Transition) -> Result<()> {
        if !transition.allowed_for(actor.role) {
            return Err(WorkflowError::Unauthorized {
                role: actor.role.to_string(),
                action: transition.to_string(),
            });
        }
        Ok(())
    }

    /// Fails before any remote call when a selected record cannot take the
    /// transition.
    fn precheck(&self, ids: &[u64], lang: &LanguageCode, transition: Transition) -> Result<Vec<ArticleRecord>> {
        let records = self.records.load()?;
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let record = records
                .iter()
                .find(|r| r.id == *id)
                .ok_or(WorkflowError::NotFound(*id))?;
            check_transition(record, lang, transition, self.strict)?;
            selected.push(record.clone());
        }
        Ok(selected)
    }

    /// Translates the selected articles, exports both versions to the
    /// staging folder, writes the translated rows to an artifact file and
    /// only then marks every id translated. Any failure leaves all flags as
    /// they were; no artifact is written for a failed export.
    pub async fn translate_batch(
        &self,
        actor: &User,
        lang: &LanguageCode,
        ids: &[u64],
    ) -> Result<TranslateOutcome> {
        self.authorize(actor, Transition::Translate)?;
        let selected = self.precheck(ids, lang, Transition::Translate)?;
        self.exporter.route(lang)?;

        let rows = self.source_rows(&selected)?;
        let context = TranslationContext::new(self.source_lang.clone(), lang.clone())
            .with_defaults(&self.translation);
        let translated = self
            .translator
            .translate(&rows, &self.translation.fields, &context)
            .await
            .map_err(WorkflowError::into_translation_failure)?;

        let report: ExportReport = self.exporter.export_records(&translated, lang).await?;
        let artifact = self.write_artifact(&translated, lang, &actor.username)?;

        let marked = self.records.update(|records| {
            apply_transition(records, ids, lang, Transition::Translate, &actor.username, self.strict)
        })?;

        info!(
            username = %actor.username,
            lang = %lang,
            articles = marked.len(),
            artifact = %artifact.display(),
            "Translation batch recorded"
        );
        Ok(TranslateOutcome {
            translated: marked,
            artifact,
            created_documents: report.created,
            skipped_documents: report.skipped,
        })
    }

    /// Text from the content file when it has the article, otherwise the
    /// article record's own title and content.
    fn source_rows(&self, selected: &[ArticleRecord]) -> Result<Vec<ContentRow>> {
        let mut content: HashMap<u64, ContentRow> = self
            .content
            .load()?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        Ok(selected
            .iter()
            .map(|article| {
                content
                    .remove(&article.id)
                    .unwrap_or_else(|| ContentRow::from_article(article))
            })
            .collect())
    }

    fn write_artifact(&self, rows: &[ContentRow], lang: &LanguageCode, username: &str) -> Result<PathBuf> {
        let path = artifact_path(&self.output_dir, lang, username, Local::now());
        write_sanitized(&path, rows)?;
        Ok(path)
    }

    /// Moves each article's documents to the reviewed folder and marks
    /// reviewed only the ids that had documents to move. A store failure
    /// stops the batch; documents already moved stay moved.
    pub async fn review_batch(
        &self,
        actor: &User,
        lang: &LanguageCode,
        ids: &[u64],
    ) -> Result<ReviewOutcome> {
        self.authorize(actor, Transition::Review)?;
        self.precheck(ids, lang, Transition::Review)?;
        self.exporter.route(lang)?;

        let mut outcome = ReviewOutcome::default();
        let mut moved_ids = Vec::new();
        for id in ids {
            let moved = self.exporter.move_by_doc_id(*id, lang).await?;
            if moved == 0 {
                warn!(article_id = id, lang = %lang, "No documents to move, article left unreviewed");
                outcome.without_documents.push(*id);
            } else {
                outcome.moved_documents += moved;
                moved_ids.push(*id);
            }
        }

        if !moved_ids.is_empty() {
            outcome.reviewed = self.records.update(|records| {
                apply_transition(records, &moved_ids, lang, Transition::Review, &actor.username, self.strict)
            })?;
        }

        info!(
            username = %actor.username,
            lang = %lang,
            reviewed = outcome.reviewed.len(),
            without_documents = outcome.without_documents.len(),
            "Review batch recorded"
        );
        Ok(outcome)
    }

    pub fn approve_batch(&self, actor: &User, lang: &LanguageCode, ids: &[u64]) -> Result<Vec<u64>> {
        self.mark(actor, lang, ids, Transition::Approve)
    }

    /// Applies the role's transition without calling either gateway.
    pub fn mark_batch(&self, actor: &User, lang: &LanguageCode, ids: &[u64]) -> Result<Vec<u64>> {
        self.mark(actor, lang, ids, Transition::for_role(actor.role))
    }

    /// One transition on one article, from the article page.
    pub fn article_action(
        &self,
        actor: &User,
        id: u64,
        lang: &LanguageCode,
        transition: Transition,
    ) -> Result<ArticleRecord> {
        self.mark(actor, lang, &[id], transition)?;
        self.records.find_by_id(id)
    }

    fn mark(&self, actor: &User, lang: &LanguageCode, ids: &[u64], transition: Transition) -> Result<Vec<u64>> {
        self.authorize(actor, transition)?;
        let marked = self.records.update(|records| {
            apply_transition(records, ids, lang, transition, &actor.username, self.strict)
        })?;
        info!(
            username = %actor.username,
            lang = %lang,
            transition = %transition,
            articles = marked.len(),
            "Articles marked"
        );
        Ok(marked)
    }
}

/// `posts_translated_{lang}_{username}_{ddmmyy_HHMMSS}.csv` in `dir`.
pub fn artifact_path(
    dir: &Path,
    lang: &LanguageCode,
    username: &str,
    at: chrono::DateTime<Local>,
) -> PathBuf {
    let safe_user: String = username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    dir.join(format!(
        "posts_translated_{}_{}_{}.csv",
        lang,
        safe_user,
        at.format("%d%m%y_%H%M%S")
    ))
}

/// Writes content rows with every cell neutralized against formula
/// evaluation.
pub fn write_sanitized(path: &Path, rows: &[ContentRow]) -> Result<usize> {
    let mut headers = vec!["id".to_string()];
    for row in rows {
        for name in row.field_names() {
            if !headers.iter().any(|h| h == name) {
                headers.push(name.to_string());
            }
        }
    }

    let mut writer = CsvStreamWriter::new(path, headers.clone()).sanitized();
    writer.initialize()?;
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                if h == "id" {
                    row.id.to_string()
                } else {
                    row.get(h).unwrap_or("").to_string()
                }
            })
            .collect();
        writer.write_row(&cells)?;
    }
    writer.finish()
}
