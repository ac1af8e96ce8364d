//! xyprompt CLI - binary entry point.
//!
//! Bridges [`xyprompt_config`] (settings on disk), [`xyprompt_engine`] (the
//! run itself) and the terminal:
//!
//! ```text
//! main() -> Cli + XyConfig -> RunSettings -> execute() -> Presenter (stdout)
//!                                                 |
//!                                                 v
//!                                    RunSummary -> copy prompt (--copy)
//! ```
//!
//! Results go to stdout; progress and status go to stderr; logs go to
//! `~/.xyprompt/logs/xyprompt.log`.

mod args;
mod copy;

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use args::{Cli, OutputFormat};
use xyprompt_config::XyConfig;
use xyprompt_engine::present::{HtmlPresenter, Presenter, TextPresenter};
use xyprompt_engine::{GeminiClient, RunSettings, RunSummary, execute, require_api_key};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Keep stdout clean for results.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.xyprompt/logs/xyprompt.log
    if let Some(config_path) = XyConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("xyprompt.log"));
    }

    // Fallback: ./.xyprompt/logs/xyprompt.log
    candidates.push(PathBuf::from(".xyprompt").join("logs").join("xyprompt.log"));

    candidates
}

fn load_config() -> Option<XyConfig> {
    match XyConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: {err}; continuing with defaults");
            None
        }
    }
}

async fn run_with<P: Presenter>(
    settings: &RunSettings,
    client: &GeminiClient,
    mut presenter: P,
) -> Option<RunSummary> {
    // The presenter already reported the failure on stderr.
    execute(settings, client, &mut presenter).await.ok()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config();
    let settings = cli.run_settings(config.as_ref())?;

    if cli.save_model {
        XyConfig::persist_model(settings.model.as_str())
            .context("failed to save the model to the config file")?;
        eprintln!("Saved {} as the default model.", settings.model);
    }

    let api_key = match require_api_key(cli.api_key(config.as_ref())) {
        Ok(key) => key,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let timeout = config
        .as_ref()
        .and_then(XyConfig::request_timeout_secs)
        .map(Duration::from_secs);
    let client = GeminiClient::builder(api_key)
        .timeout(timeout)
        .build()
        .context("failed to build the HTTP client")?;

    let stdout = io::stdout().lock();
    let stderr = io::stderr();
    let summary = match cli.format {
        OutputFormat::Text => {
            run_with(&settings, &client, TextPresenter::new(stdout, stderr)).await
        }
        OutputFormat::Html => {
            run_with(&settings, &client, HtmlPresenter::new(stdout, stderr)).await
        }
    };

    let Some(summary) = summary else {
        return Ok(ExitCode::FAILURE);
    };

    if cli.copy && !summary.results.is_empty() {
        let mut status = io::stderr();
        match copy::SystemClipboard::open() {
            Ok(mut clipboard) => {
                copy::copy_prompt(&summary.results, io::stdin().lock(), &mut status, &mut clipboard)?;
            }
            Err(err) => {
                writeln!(status, "Copy failed: {}", err.0)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
