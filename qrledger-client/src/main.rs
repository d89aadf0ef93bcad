use std::{net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use qrledger_client::{
    AddForm, ApiClient, QrManager, SystemTimeProvider,
    offline::{DiskCacheStorage, HttpNetwork, Network, OfflineCache, proxy},
    scanner::{DecoderHints, LineDecoder, ScanHandler, ScanLoop},
    ui::{HtmlSurface, Surface, Tab, TerminalSurface, TracingNotifier},
};
use qrledger_config::{Config, ConfigLoader};
use qrledger_model::QrRecordId;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "qrledger")]
#[command(about = "Register, scan and verify QR codes against a qrledger registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct GlobalArgs {
    /// Path to a qrledger.toml configuration file
    #[arg(long, global = true, env = "QRLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Registry base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format for rendered views
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new QR code
    Add {
        number: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List registered QR codes, newest first
    List,
    /// Delete a QR code by id
    Delete { id: i64 },
    /// Look a payload up in the registry
    Verify { content: String },
    /// Show creation counters
    Stats,
    /// Verify payloads read line by line from stdin
    Scan,
    /// Serve the registry's assets through the offline cache
    Proxy {
        /// Listen address (overrides config)
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Skip pre-caching the asset list
        #[arg(long)]
        skip_install: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli.global)?;

    run_command(&config, &cli.global, cli.command).await
}

fn load_config(args: &GlobalArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    let load = loader.load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &load.config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    load.warnings.log();

    let mut config = load.config;
    if let Some(api_url) = &args.api_url {
        config.client.api_url = url::Url::parse(api_url)
            .with_context(|| format!("invalid --api-url '{api_url}'"))?;
    }
    Ok(config)
}

fn build_manager(config: &Config, args: &GlobalArgs) -> anyhow::Result<Arc<QrManager>> {
    let client = ApiClient::new(
        config.client.api_url.as_str(),
        config.client.request_timeout,
    )
    .context("failed to build registry client")?;

    let surface: Arc<dyn Surface> = match args.format {
        Format::Text => Arc::new(TerminalSurface::new(args.yes)),
        Format::Html => Arc::new(HtmlSurface::new(args.yes)),
    };

    Ok(Arc::new(QrManager::new(
        Arc::new(client),
        surface,
        Arc::new(TracingNotifier),
        Arc::new(SystemTimeProvider),
        config.scanner.cooldown,
    )))
}

async fn run_command(
    config: &Config,
    args: &GlobalArgs,
    command: Command,
) -> anyhow::Result<ExitCode> {
    if let Command::Proxy {
        listen,
        skip_install,
    } = command
    {
        return run_proxy(config, listen, skip_install).await;
    }
    let manager = build_manager(config, args)?;

    match command {
        Command::Add {
            number,
            name,
            description,
        } => {
            let accepted = manager
                .submit_add_form(AddForm {
                    number,
                    name,
                    description,
                })
                .await;
            if !accepted {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::List => manager.show_tab(Tab::List).await,
        Command::Delete { id } => manager.delete_record(QrRecordId::new(id)).await,
        Command::Verify { content } => {
            manager.submit_manual_verify(&content).await;
        }
        Command::Stats => manager.show_stats().await,
        Command::Scan => return run_scan(config, manager).await,
        Command::Proxy { .. } => {}
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_scan(
    config: &Config,
    manager: Arc<QrManager>,
) -> anyhow::Result<ExitCode> {
    let hints = DecoderHints {
        max_scans_per_second: config.scanner.max_scans_per_second,
        ..DecoderHints::default()
    };
    let decoder = LineDecoder::with_hints(BufReader::new(tokio::io::stdin()), &hints);
    let handler: Arc<dyn ScanHandler> = manager;
    let mut scan_loop = ScanLoop::new(
        decoder,
        handler,
        Arc::new(SystemTimeProvider),
        config.scanner.cooldown,
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match scan_loop.run(cancel).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => {
            warn!(%error, "scanning stopped");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_proxy(
    config: &Config,
    listen: Option<SocketAddr>,
    skip_install: bool,
) -> anyhow::Result<ExitCode> {
    let offline = &config.offline;
    offline
        .ensure_cache_root()
        .with_context(|| format!("failed to create {}", offline.cache_root().display()))?;

    let network: Arc<dyn Network> = Arc::new(
        HttpNetwork::new(offline.origin.clone(), config.client.request_timeout)
            .context("failed to build HTTP client")?,
    );
    let cache = Arc::new(OfflineCache::new(
        Arc::new(DiskCacheStorage::new(offline.cache_root())),
        Arc::clone(&network),
        offline.cache_name.clone(),
        offline.origin.clone(),
        offline.assets.clone(),
    ));

    if !skip_install && let Err(error) = cache.install().await {
        warn!(%error, "pre-caching failed; serving without a complete cache");
    }
    let deleted = cache.activate().await.context("failed to prune old caches")?;
    if !deleted.is_empty() {
        info!(?deleted, "removed stale caches");
    }

    let addr = listen.unwrap_or(offline.proxy_listen);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(origin = %offline.origin, "Starting offline proxy on http://{addr}");

    axum::serve(listener, proxy::router(cache, network))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("offline proxy stopped");
    Ok(ExitCode::SUCCESS)
}
