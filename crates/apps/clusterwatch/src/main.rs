//! Clusterwatch - terminal front-end for cluster sync status
//!
//! Polls the dashboard in the background, starts syncs from the prompt
//! and prints toasts and counter changes as they happen.

use std::sync::Arc;

use anyhow::Result;
use clustersync::{ButtonId, DashboardClient, SyncCoordinator, SyncSettings, SystemClock};
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::block_in_place;
use tokio::time::Instant;

mod commands;
mod terminal;

use commands::{Command, HELP};
use terminal::{SYNC_ALL_BUTTON, TerminalPage};

type Coordinator = SyncCoordinator<TerminalPage>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = match SyncSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {:#}", e);
            if let Some(path) = SyncSettings::default_settings_path() {
                warn!("Settings are read from {}", path.display());
            }
            SyncSettings::default()
        }
    };

    let client = DashboardClient::from_settings(&settings)?;
    info!("Watching dashboard at {}", client.base_url());

    let mut coordinator = SyncCoordinator::new(
        Arc::new(client),
        TerminalPage::new(),
        Arc::new(SystemClock),
        &settings,
    );

    // Requests block, so coordinator calls run where blocking is allowed
    block_in_place(|| coordinator.start());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let deadline = coordinator.next_deadline().map(Instant::from_std);

        tokio::select! {
            _ = sleep_until(deadline) => {
                block_in_place(|| coordinator.run_due());
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => block_in_place(|| execute(&mut coordinator, command)),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                },
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    coordinator.shutdown();
    info!("Stopped polling");
    Ok(())
}

/// Sleep until the next timer deadline, or forever when none is armed
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn execute(coordinator: &mut Coordinator, command: Command) {
    match command {
        Command::Sync(cluster_id) => {
            let button = coordinator.page_mut().cluster_button(cluster_id.as_str());
            coordinator.sync_one(&cluster_id, Some(&button));
        }
        Command::SyncAll => {
            coordinator.sync_all(Some(&ButtonId::new(SYNC_ALL_BUTTON)));
        }
        Command::Stats(cluster_id) => {
            if let Some(stats) = coordinator.refresh_cluster_stats(&cluster_id) {
                println!("{}", stats.summary());
            }
        }
        Command::Status => {
            println!("{}", coordinator.page().summary_line());

            let mut syncing: Vec<&str> =
                coordinator.syncing().iter().map(|id| id.as_str()).collect();
            syncing.sort_unstable();
            if syncing.is_empty() {
                println!("No syncs in progress");
            } else {
                println!("Syncing: {}", syncing.join(", "));
            }

            for button in coordinator.page().busy_buttons() {
                println!("  busy: {button}");
            }
        }
        Command::Help => println!("{HELP}"),
        // Handled by the prompt loop
        Command::Quit => {}
    }
}
