use anyhow::Context;
use clap::Parser;
use nb_core::logging::init_logging;
use nb_core::{ArchiveStorage, ChannelId, LinkSubmission};
use nb_inference::{condenser::LlmCondenser, relevance::LlmRelevanceClassifier};
use nb_pipeline::{drain_notifications, forward_notifications, CondenseFailurePolicy, Dispatcher, Pipeline};
use nb_scrapers::WebExtractor;
use nb_storage::{create_backend, ArchiveWriter, BackendConfig, BackendKind, DriveSession};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// How long in-flight submissions get to deliver their replies on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

mod config;
mod telegram;

use config::Config;
use telegram::TelegramClient;

/// A duration such as `45m`, `1h30m` or `90` (seconds).
#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut digits = String::new();

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let n: u64 = digits
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_seconds = n
                .checked_mul(unit)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(too_large)?;
            digits.clear();
        }

        if !digits.is_empty() {
            let n = digits.parse::<u64>().map_err(|e| e.to_string())?;
            total_seconds = total_seconds.checked_add(n).ok_or_else(too_large)?;
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

fn too_large() -> String {
    "Duration is too large".to_string()
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Condenses relevant news links sent to a Telegram bot and archives them", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "openai", help = "Model to use for inference. Available models: openai (default), dummy")]
    model: String,
    #[arg(long, default_value = "drive", help = "Where summaries are archived. Available storages: drive (default), local, memory")]
    storage: String,
    #[arg(long, default_value = "archive", help = "Directory used by the local storage")]
    local_dir: PathBuf,
    #[arg(long, default_value = "archive", help = "On summary failure: archive (store a placeholder) or abort")]
    on_condense_failure: String,
    #[arg(long, help = "Keep-alive port, overrides PORT")]
    port: Option<u16>,
    #[arg(long, default_value = "45m", help = "How often the Drive session is refreshed (e.g. 30m, 1h)")]
    refresh_every: HumanDuration,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the bot: poll Telegram and serve the keep-alive endpoint.
    Run,
    /// Push a single link through the pipeline and print the result.
    Process { url: String },
}

struct Assembled {
    pipeline: Pipeline,
    session: Option<Arc<DriveSession>>,
}

fn build_storage(
    cli: &Cli,
    config: &Config,
) -> anyhow::Result<(Arc<dyn ArchiveStorage>, String, Option<Arc<DriveSession>>)> {
    let kind = BackendKind::from_str(&cli.storage)?;
    let (backend, folder, session) = match kind {
        BackendKind::Drive => {
            let folder = config.require_drive_folder()?.to_string();
            let credentials = config.drive_credentials()?;
            let session = Arc::new(DriveSession::new(credentials).context("Could not build the Drive session")?);
            (BackendConfig::Drive { session: session.clone() }, folder, Some(session))
        }
        BackendKind::Local => (
            BackendConfig::Local { root: cli.local_dir.clone() },
            config.drive_folder_id.clone().unwrap_or_else(|| "notucias".to_string()),
            None,
        ),
        BackendKind::Memory => (BackendConfig::Memory, "notucias".to_string(), None),
    };
    Ok((create_backend(backend)?, folder, session))
}

fn assemble(cli: &Cli, config: &Config) -> anyhow::Result<Assembled> {
    let model = nb_inference::create_model(&cli.model, &config.inference)?;
    info!("🧠 Inference model initialized successfully (using {})", model.name());

    let (storage, folder, session) = build_storage(cli, config)?;
    info!("🏦 Storage backend initialized successfully (using {})", storage.name());

    let policy = CondenseFailurePolicy::from_str(&cli.on_condense_failure)?;
    let model_name = config.inference.model_name.clone();

    let pipeline = Pipeline::new(
        Arc::new(WebExtractor::new()?),
        Arc::new(LlmRelevanceClassifier::new(model.clone(), model_name.clone())),
        Arc::new(LlmCondenser::new(model, model_name)),
        Arc::new(ArchiveWriter::new(storage, folder, config.staging_dir.clone())),
        config.topic.clone(),
    )
    .with_condense_failure_policy(policy);
    info!("📰 Relevance topic: {}", pipeline.topic());

    Ok(Assembled { pipeline, session })
}

async fn run(cli: &Cli, config: &Config, assembled: Assembled) -> anyhow::Result<()> {
    let telegram = Arc::new(TelegramClient::new(config.require_bot_token()?)?);

    let port = cli.port.unwrap_or(config.port);
    let web = tokio::spawn(async move {
        if let Err(e) = nb_web::serve(port).await {
            error!("Keep-alive server stopped: {}", e);
        }
    });

    let refresher = assembled
        .session
        .map(|session| session.spawn_refresh(cli.refresh_every.0));

    let (dispatcher, rx) = Dispatcher::new(Arc::new(assembled.pipeline));
    let forwarder = tokio::spawn(forward_notifications(rx, telegram.clone()));

    tokio::select! {
        _ = telegram.run(&dispatcher) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Could not listen for shutdown signal")?;
            info!("👋 Shutting down");
        }
    }

    drain_notifications(dispatcher, forwarder, SHUTDOWN_GRACE).await;
    if let Some(refresher) = refresher {
        refresher.abort();
    }
    web.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = Config::load().context("Could not read configuration")?;
    let assembled = assemble(&cli, &config)?;

    match &cli.command {
        Commands::Run => run(&cli, &config, assembled).await?,
        Commands::Process { url } => {
            let outcome = assembled
                .pipeline
                .process(&LinkSubmission::new(url.clone(), ChannelId(0)))
                .await;
            println!("{}", outcome.message());
            if let nb_core::Outcome::Archived { filename } = &outcome {
                println!("{}", filename);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("notucias").chain(args.iter().copied()))
    }

    fn parse(args: &[&str]) -> Cli {
        parse_args(args).unwrap()
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(HumanDuration::from_str("45m").unwrap().0, Duration::from_secs(2700));
        assert_eq!(HumanDuration::from_str("1h 15m30s").unwrap().0, Duration::from_secs(4530));
        assert_eq!(HumanDuration::from_str("90").unwrap().0, Duration::from_secs(90));
        assert!(HumanDuration::from_str("0").is_err());
        assert!(HumanDuration::from_str("h").is_err());
        assert!(HumanDuration::from_str("5w").is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_rejected() {
        assert_eq!(
            HumanDuration::from_str("999999999999999999d").unwrap_err(),
            "Duration is too large"
        );
        assert!(HumanDuration::from_str("18446744073709551615s1s").is_err());
        assert!(HumanDuration::from_str("1s18446744073709551615").is_err());
        assert!(parse_args(&["--refresh-every", "999999999999999999d", "run"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["run"]);
        assert_eq!(cli.model, "openai");
        assert_eq!(cli.storage, "drive");
        assert_eq!(cli.on_condense_failure, "archive");
        assert_eq!(cli.refresh_every.0, Duration::from_secs(2700));
        assert!(matches!(cli.command, Commands::Run));
    }

    #[test]
    fn test_assemble_offline_pipeline() {
        let cli = parse(&[
            "--model", "dummy", "--storage", "memory", "--on-condense-failure", "abort",
            "process", "https://example.com",
        ]);
        let config = Config::from_lookup(|_| None).unwrap();

        let assembled = assemble(&cli, &config).unwrap();
        assert!(assembled.session.is_none());
        assert_eq!(assembled.pipeline.topic(), "educación");
    }

    #[test]
    fn test_drive_storage_requires_configuration() {
        let cli = parse(&["--model", "dummy", "run"]);
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(assemble(&cli, &config).is_err());

        let cli = parse(&["--model", "openai", "--storage", "memory", "run"]);
        assert!(assemble(&cli, &config).is_err(), "openai needs an API key");
    }
}
