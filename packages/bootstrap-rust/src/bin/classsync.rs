//! Brings the mandatory class documents of one or more wikis in line with
//! their built-in schemas.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use classsync_bootstrap::config::DEFAULT_PRIMARY_WIKI;
use classsync_bootstrap::logging::init_tracing;
use classsync_bootstrap::{
    BootstrapConfig, Bootstrapper, DocumentOutcome, LogConfig, LogFormat, StoreConfig,
};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "classsync", version, about)]
struct Cli {
    /// Directory of the JSON document store; documents stay in memory when omitted.
    #[arg(long, env = "CLASSSYNC_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Identifier of the primary wiki.
    #[arg(long, env = "CLASSSYNC_PRIMARY_WIKI", default_value = DEFAULT_PRIMARY_WIKI)]
    primary_wiki: String,

    /// Wiki to initialize; repeat for several. Defaults to the primary wiki.
    #[arg(long = "wiki", env = "CLASSSYNC_WIKI", value_delimiter = ',')]
    wikis: Vec<String>,

    #[arg(long, env = "CLASSSYNC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[arg(long, env = "CLASSSYNC_LOG_FILTER", default_value = "info")]
    log_filter: String,
}

impl From<Cli> for BootstrapConfig {
    fn from(cli: Cli) -> Self {
        Self {
            primary_wiki: cli.primary_wiki,
            wikis: cli.wikis,
            store: cli.store_dir.map_or(StoreConfig::Memory, StoreConfig::Directory),
            log: LogConfig {
                format: cli.log_format,
                filter: cli.log_filter,
            },
        }
    }
}

async fn run(config: BootstrapConfig) -> anyhow::Result<bool> {
    let bootstrapper = Bootstrapper::from_config(&config).await?;
    let reports = bootstrapper.initialize_all(&config.effective_wikis()).await;

    let mut clean = true;
    for report in &reports {
        println!(
            "{}: {} saved, {} failed, {} documents",
            report.wiki,
            report.saved(),
            report.failed(),
            report.documents.len()
        );
        for (reference, outcome) in &report.documents {
            if let DocumentOutcome::Failed { error } = outcome {
                clean = false;
                println!("  {reference}: {}", error_chain(error));
            }
        }
    }
    Ok(clean)
}

/// Flattens an error and its sources into one message.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = BootstrapConfig::from(Cli::parse());
    if let Err(e) = init_tracing(&config.log) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{e:#}"), "bootstrap aborted");
            ExitCode::FAILURE
        }
    }
}
