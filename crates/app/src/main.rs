use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use drill_core::model::{OperationKind, SettingsDraft};
use services::{AppServices, Clock, HttpDocumentStore, HttpStoreConfig, RemoteAccount};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;
mod terminal;

use cli::{Cli, Command};

fn remote_account(cli: &Cli) -> Option<RemoteAccount> {
    match (&cli.remote_url, &cli.user_id) {
        (Some(base_url), Some(user_id)) => {
            let store = HttpDocumentStore::new(HttpStoreConfig {
                base_url: base_url.clone(),
                token: cli.remote_token.clone(),
            });
            Some(RemoteAccount::new(Arc::new(store), user_id.clone()))
        }
        (Some(_), None) => {
            warn!("remote url set without a user id, remote sync disabled");
            None
        }
        _ => None,
    }
}

async fn configure(
    services: &AppServices,
    length: Option<u32>,
    only: Option<Vec<OperationKind>>,
    digits: Vec<cli::DigitsArg>,
) -> Result<(), Box<dyn Error>> {
    let settings_service = services.settings();
    let current = settings_service.load().await;
    let mut draft = SettingsDraft::from_settings(&current);

    if let Some(secs) = length {
        draft.length_secs = Some(secs);
    }
    let mut operations = current.operations().clone();
    if let Some(kinds) = only {
        for kind in OperationKind::ALL {
            operations.set_enabled(kind, kinds.contains(&kind));
        }
    }
    for arg in digits {
        operations.set_digits(arg.kind, arg.first, arg.second);
    }
    draft.operations = Some(operations);

    let saved = settings_service.save(draft).await?;
    println!("length: {}", saved.length());
    for kind in saved.operations().enabled_kinds() {
        let entry = saved.operations().settings_for(kind);
        let (a_min, a_max) = entry.first_operand_digits.ordered();
        let (b_min, b_max) = entry.second_operand_digits.ordered();
        if kind == OperationKind::PercentOf {
            println!("{:<15} base digits {b_min}-{b_max}", kind.key());
        } else {
            println!("{:<15} digits {a_min}-{a_max} / {b_min}-{b_max}", kind.key());
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let db_url = cli::normalize_sqlite_url(&cli.db_url);
    cli::prepare_sqlite_file(&db_url)?;
    let services =
        AppServices::new_sqlite(&db_url, Clock::default_clock(), remote_account(&cli)).await?;

    match cli.command {
        Command::Play { seed } => terminal::play(&services, seed).await,
        Command::History { limit } => {
            let summaries = services.history().recent(limit).await?;
            terminal::print_history(&summaries);
            Ok(())
        }
        Command::Stats => {
            let stats = services.history().stats().await?;
            terminal::print_stats(&stats);
            Ok(())
        }
        Command::Goals => {
            let report = services.history().goals().await?;
            terminal::print_goals(&report);
            Ok(())
        }
        Command::Configure {
            length,
            only,
            digits,
        } => configure(&services, length, only, digits).await,
        Command::Sync => {
            let pushed = services.sync().sync_local_to_remote().await?;
            let settings = if pushed.settings { " and settings" } else { "" };
            println!("pushed {} sessions{settings}", pushed.sessions);
            Ok(())
        }
        Command::Restore => {
            let restored = services.sync().restore_remote_to_local().await?;
            if restored.settings {
                println!("restored settings");
            }
            if restored.sessions == 0 {
                println!("remote history is empty, local history kept");
            } else {
                println!("restored {} sessions", restored.sessions);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
