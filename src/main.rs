//! recap - Meeting transcript summaries you can edit and email
//!
//! Entry point for the recap CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recap::cli::{Cli, Commands};
use recap::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        recap::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let default_level = if cli.verbose {
        "debug".to_string()
    } else {
        settings.general.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { addr } => {
            recap::cli::commands::serve(&settings, addr).await?;
        }
        Commands::Upload { file } => {
            recap::cli::commands::upload_transcript(&settings, &file).await?;
        }
        Commands::Summarize {
            transcript_id,
            instruction,
        } => {
            recap::cli::commands::summarize_transcript(&settings, &transcript_id, &instruction)
                .await?;
        }
        Commands::Digest {
            file,
            instruction,
            json,
        } => {
            recap::cli::commands::digest_transcript(&settings, &file, &instruction, json).await?;
        }
        Commands::Show { summary_id, json } => {
            recap::cli::commands::show_summary(&settings, &summary_id, json).await?;
        }
        Commands::Edit {
            summary_id,
            text,
            file,
        } => {
            recap::cli::commands::edit_summary(&settings, &summary_id, text, file.as_deref())
                .await?;
        }
        Commands::Share {
            summary_id,
            recipients,
        } => {
            recap::cli::commands::share_summary(&settings, &summary_id, recipients).await?;
        }
        Commands::List { limit } => {
            recap::cli::commands::list_summaries(&settings, limit).await?;
        }
        Commands::Config(config_cmd) => {
            recap::cli::commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
