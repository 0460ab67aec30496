//! calsync CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calsync_client::cli::{Cli, Command, ConfigAction};
use calsync_client::commands::events::{self, EventChanges};
use calsync_client::config::ClientConfig;
use calsync_client::error::{ClientError, ClientResult};
use calsync_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config)?,
        None => ClientConfig::load().map_err(ClientError::Config)?,
    }
    .with_env_fallbacks();

    if let Err(e) = init_tracing(TracingConfig::for_cli(cli.debug || config.debug)) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match cli.command {
        Command::Config { ref action } => match action {
            ConfigAction::Dump => calsync_client::commands::config::dump(&config),
            ConfigAction::Validate => calsync_client::commands::config::validate(&config),
            ConfigAction::Path => calsync_client::commands::config::path(),
        },
        Command::List { ref day, json } => {
            let reconciler = events::connect(&cli, &config)?;
            events::list(&reconciler, &config, day.as_deref(), json).await
        }
        Command::Show { ref id, json } => {
            let reconciler = events::connect(&cli, &config)?;
            events::show(&reconciler, &config, id, json).await
        }
        Command::Create {
            ref title,
            ref start,
            ref end,
            ref description,
        } => {
            let reconciler = events::connect(&cli, &config)?;
            events::create(
                &reconciler,
                title.clone(),
                start,
                end.as_deref(),
                description.clone(),
            )
            .await
        }
        Command::Edit {
            ref id,
            ref title,
            ref start,
            ref end,
            ref description,
        } => {
            let reconciler = events::connect(&cli, &config)?;
            let changes = EventChanges {
                title: title.clone(),
                start: start.clone(),
                end: end.clone(),
                description: description.clone(),
            };
            events::edit(&reconciler, id, changes).await
        }
        Command::Delete { ref id } => {
            let reconciler = events::connect(&cli, &config)?;
            events::delete(&reconciler, id).await
        }
    }
}
