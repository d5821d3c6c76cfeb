mod cli;
mod config;
mod platform;
mod popup;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info, LogDestination};
use log::LevelFilter;
use minomize_core::video::result_url;
use minomize_core::ButtonState;
use minomize_engine::{
    ensure_data_dir, BackgroundWorker, InstallReason, ReqwestApiClient, RelayHandle, StatusSource,
};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::platform::effects::EffectRunner;
use crate::platform::presenter::TerminalPresenter;
use crate::popup::{print_rows, Popup};

const LOG_FILENAME: &str = "minomize.log";

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?
        .with_env(|key| std::env::var(key).ok())
        .with_overrides(cli.api_base.clone(), cli.data_dir.clone());

    let data_dir = config.data_dir();
    let first_run = !data_dir.exists();
    ensure_data_dir(&data_dir).context("failed to prepare data directory")?;

    let (destination, level) = if cli.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    engine_logging::initialize(destination, level, &data_dir.join(LOG_FILENAME));
    engine_info!("Using API at {}", config.api_base_url);

    let api = ReqwestApiClient::new(config.api_settings())?;
    let presenter = Arc::new(TerminalPresenter::new(config.open_command.clone()));
    let worker = Arc::new(BackgroundWorker::new(
        Arc::new(api),
        presenter.clone(),
        presenter,
    ));
    if first_run {
        worker.on_installed(InstallReason::Install);
    }
    let relay = RelayHandle::spawn(worker);

    match cli.command {
        Command::Watch { page_url, open } => {
            let running = Popup::open(relay.clone(), &config, &data_dir)?.running_page_store();
            let runner = EffectRunner::new(
                relay,
                config.poll_policy(),
                &config.frontend_base_url,
                open,
            )
            .with_page_store(running);
            let outcome = runner.run(&page_url).await;
            if outcome == ButtonState::Completed {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Submit { tab_url, title } => {
            let mut popup = Popup::open(relay, &config, &data_dir)?;
            let job_id = popup.submit(&tab_url, title.as_deref()).await?;
            println!("Processing started! You'll be notified when it's ready.");
            println!("Job {job_id}");
            Ok(ExitCode::SUCCESS)
        }
        Command::History { follow } => {
            let mut popup = Popup::open(relay, &config, &data_dir)?;
            let interval = follow.then(|| config.refresh_interval());
            let mut first = true;
            popup
                .show_history(interval, |rows| {
                    if !std::mem::take(&mut first) {
                        println!();
                    }
                    print_rows(rows);
                })
                .await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Status { job_id } => {
            let report = relay.check_status(&job_id).await?;
            match (&report.message, report.progress) {
                (Some(message), _) => println!("{}: {}", report.status, message),
                (None, Some(progress)) => println!("{}: {}%", report.status, progress),
                (None, None) => println!("{}", report.status),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Open { job_id } => {
            let url = result_url(&config.frontend_base_url, &job_id);
            let response = relay.open_tab(&url).await;
            if !response.success {
                anyhow::bail!("{}", response.error_message());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
