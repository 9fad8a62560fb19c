use clap::Parser;
use translation_review::cli::{self, Cli, Command, ServeArgs};
use translation_review::utils::config::LoggingConfig;
use translation_review::{create_router, AppConfig, AppState, WorkflowService};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Cli::parse();
    let config = AppConfig::load_or_default(Some(opts.config.as_path()))?;
    init_tracing(&config.logging)?;
    tracing::info!(path = %opts.config.display(), "Loaded configuration: {}", config.server.name);

    match opts.command {
        Command::Serve(args) => run_http_server(config, args).await?,
        Command::Translate(args) => {
            let rows = cli::run_translate(&config, &args).await?;
            tracing::info!(rows, "Translation finished");
        }
        Command::Export(args) => {
            let report = cli::run_export(&config, &args).await?;
            tracing::info!(
                created = report.created,
                skipped = report.skipped,
                "Export finished"
            );
        }
        Command::Import(args) => {
            let rows = cli::import_posts(&config, &args).await?;
            tracing::info!(rows, "Import finished");
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `logging.level` when set.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };
    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
    Ok(())
}

async fn run_http_server(config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    config.validate()?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);

    let workflow = WorkflowService::from_config(&config)?;
    let languages: Vec<String> = workflow.languages().iter().map(|l| l.to_string()).collect();
    let app = create_router(AppState::new(config, workflow));

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(languages = ?languages, "HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
