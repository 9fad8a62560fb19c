//! Command line: the web app plus the offline batch jobs around it.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::csv_processor::{CsvStreamReader, CsvTable};
use crate::database::{CmsDatabase, CmsDbConfig};
use crate::export::{DocumentExporter, ExportReport, GoogleDocsStore};
use crate::records::{
    read_content_rows, select_posts, write_content_rows, LanguageCode, RowFilter,
};
use crate::translation::{OpenAiClient, TranslationContext, TranslationGateway};
use crate::utils::{AppConfig, Result};

#[derive(Parser, Debug)]
#[command(
    name = "translation-review",
    version,
    about = "Translate, review and approve editorial articles per target language",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = "config.toml",
        env = "TRANSLATION_REVIEW_CONFIG"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the review web app
    Serve(ServeArgs),
    /// Translate the title and content columns of a posts CSV
    Translate(TranslateArgs),
    /// File a translated posts CSV into a language's staging folder
    Export(ExportArgs),
    /// Build the content file from a CMS posts export and a title list
    Import(ImportArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind, overriding `server.bind`
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on, overriding `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Posts CSV with `id`, `title` and `content` columns
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the rows with their translated columns
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Target language code
    #[arg(short, long)]
    pub lang: String,

    /// Source language code, overriding `translation.source_lang`
    #[arg(short, long)]
    pub source: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Translated posts CSV with `title_<lang>` and `content_<lang>` columns
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Language whose staging folder receives the documents
    #[arg(short, long)]
    pub lang: String,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Title list CSV, e.g. the editorial planning sheet
    #[arg(long, value_name = "FILE")]
    pub titles: PathBuf,

    /// Posts CSV exported from the CMS
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present = "from_db",
        conflicts_with = "from_db"
    )]
    pub posts: Option<PathBuf>,

    /// Read posts straight from the CMS database (`CMS_DB_*` variables)
    #[arg(long)]
    pub from_db: bool,

    /// Only posts created within this PostgreSQL interval, e.g. "30 days"
    #[arg(long, value_name = "INTERVAL", requires = "from_db")]
    pub since: Option<String>,

    /// Column of the title list holding the titles
    #[arg(long, default_value = "title")]
    pub title_column: String,

    /// Keep only title list rows where COLUMN equals VALUE; repeat for more
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Content file to write, overriding `data.content_file`
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Translates every row of a posts file in one batch.
pub async fn translate_file(
    config: &AppConfig,
    gateway: &TranslationGateway,
    args: &TranslateArgs,
) -> Result<usize> {
    let source = LanguageCode::parse(
        args.source
            .as_deref()
            .unwrap_or(&config.translation.source_lang),
    )?;
    let target = LanguageCode::parse(&args.lang)?;
    let rows = read_content_rows(&args.input)?;
    info!(rows = rows.len(), input = %args.input.display(), "Translating posts file");

    let context = TranslationContext::new(source, target).with_defaults(&config.translation);
    let translated = gateway
        .translate(&rows, &config.translation.fields, &context)
        .await?;
    let written = write_content_rows(&args.output, &translated)?;
    info!(rows = written, output = %args.output.display(), "Translated posts written");
    Ok(written)
}

pub async fn export_file(exporter: &DocumentExporter, args: &ExportArgs) -> Result<ExportReport> {
    let lang = LanguageCode::parse(&args.lang)?;
    let rows = read_content_rows(&args.input)?;
    exporter.export_records(&rows, &lang).await
}

async fn load_posts(args: &ImportArgs) -> Result<CsvTable> {
    match &args.posts {
        Some(path) => CsvStreamReader::new(path).read_table(),
        None => {
            let db = CmsDatabase::connect(&CmsDbConfig::from_env()?).await?;
            db.fetch_posts(args.since.as_deref()).await
        }
    }
}

pub async fn import_posts(config: &AppConfig, args: &ImportArgs) -> Result<usize> {
    let filter = RowFilter::parse(&args.filters)?;
    let titles = CsvStreamReader::new(&args.titles).read_table()?;
    let posts = load_posts(args).await?;

    let selected = select_posts(&titles, &args.title_column, &filter, &posts)?;
    let output: &Path = args
        .output
        .as_deref()
        .unwrap_or(&config.data.content_file);
    let written = write_content_rows(output, &selected)?;
    info!(
        listed = titles.rows.len(),
        from_db = args.from_db,
        filtered = !filter.is_empty(),
        imported = written,
        output = %output.display(),
        "Posts imported"
    );
    Ok(written)
}

pub async fn run_translate(config: &AppConfig, args: &TranslateArgs) -> Result<usize> {
    let gateway = TranslationGateway::new(Arc::new(OpenAiClient::from_config(&config.translation)?));
    translate_file(config, &gateway, args).await
}

pub async fn run_export(config: &AppConfig, args: &ExportArgs) -> Result<ExportReport> {
    let store = GoogleDocsStore::from_config(&config.google)?;
    let exporter = DocumentExporter::new(Arc::new(store), config.folder_routes()?);
    export_file(&exporter, args).await
}
