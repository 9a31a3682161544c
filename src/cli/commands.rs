//! CLI command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::email::{MailError, Mailer, SmtpMailer};
use crate::llm::build_provider;
use crate::service;
use crate::storage::{Database, ShareRecord, Summary, SummaryStore};
use crate::summary::{StructuredSummary, SummaryPipeline};

/// Run the HTTP server
pub async fn serve(settings: &Settings, addr: Option<String>) -> Result<()> {
    crate::server::serve(settings, addr).await
}

/// Store a transcript from a file or stdin
pub async fn upload_transcript(settings: &Settings, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    if text.trim().is_empty() {
        anyhow::bail!("Transcript is empty");
    }

    let db = Database::open(settings)?;
    let transcript = service::upload_transcript(&db, text)?;

    println!("Transcript stored: {}", transcript.id);
    Ok(())
}

/// Summarize a stored transcript and save the result
pub async fn summarize_transcript(
    settings: &Settings,
    transcript_id: &str,
    instruction: &str,
) -> Result<()> {
    let db = Database::open(settings)?;
    let transcript_id = db
        .find_transcript_id(transcript_id)?
        .context("Transcript not found")?;

    let pipeline = SummaryPipeline::from_settings(build_provider(settings)?, settings);
    let summary = service::summarize_transcript(&db, &pipeline, &transcript_id, instruction).await?;

    println!("Summary saved: {}", summary.id);
    println!();
    print_summary(&summary.structured, &summary.editable_text);

    Ok(())
}

#[derive(Serialize)]
struct DigestOutput<'a> {
    structured: &'a serde_json::Value,
    editable_text: &'a str,
}

/// Summarize a transcript file without touching the database
pub async fn digest_transcript(
    settings: &Settings,
    file: &Path,
    instruction: &str,
    json: bool,
) -> Result<()> {
    let text = read_input(file)?;
    let pipeline = SummaryPipeline::from_settings(build_provider(settings)?, settings);
    let outcome = pipeline.generate_summary(&text, instruction).await?;

    if json {
        let output = DigestOutput {
            structured: &outcome.structured,
            editable_text: &outcome.editable_text,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&outcome.structured, &outcome.editable_text);
    }

    Ok(())
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    shares: &'a [ShareRecord],
}

/// Show a stored summary
pub async fn show_summary(settings: &Settings, summary_id: &str, json: bool) -> Result<()> {
    let db = Database::open(settings)?;
    let summary = find_summary(&db, summary_id)?;
    let shares = db.list_shares(&summary.id)?;

    if json {
        let output = ShowOutput {
            summary: &summary,
            shares: &shares,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Summary: {}", summary.id);
    println!("Transcript: {}", summary.transcript_id);
    println!("Created: {}", summary.created_at.format("%Y-%m-%d %H:%M"));
    if summary.is_edited() {
        println!("Edited: {}", summary.updated_at.format("%Y-%m-%d %H:%M"));
    }
    println!();
    print_summary(&summary.structured, &summary.editable_text);

    if !shares.is_empty() {
        println!();
        println!("Shares:");
        for share in shares {
            let status = if share.delivered {
                "sent".to_string()
            } else {
                format!("failed: {}", share.detail.as_deref().unwrap_or("unknown error"))
            };
            println!(
                "  {} {} ({})",
                share.created_at.format("%Y-%m-%d %H:%M"),
                share.recipients.join(", "),
                status
            );
        }
    }

    Ok(())
}

/// Replace a summary's editable text
pub async fn edit_summary(
    settings: &Settings,
    summary_id: &str,
    text: Option<String>,
    file: Option<&Path>,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(file)) => read_input(file)?,
        (None, None) => anyhow::bail!("Provide the new text with --text or --file"),
    };

    let db = Database::open(settings)?;
    let summary = find_summary(&db, summary_id)?;
    service::edit_summary(&db, &summary.id, &text)?;

    println!("Summary {} updated", short_id(&summary.id));
    Ok(())
}

/// Email a summary's editable text
pub async fn share_summary(
    settings: &Settings,
    summary_id: &str,
    recipients: Vec<String>,
) -> Result<()> {
    let db = Database::open(settings)?;
    let summary = find_summary(&db, summary_id)?;

    let mailer = match SmtpMailer::from_settings(settings) {
        Ok(mailer) => Some(mailer),
        Err(MailError::MissingCredentials) => None,
        Err(e) => return Err(e).context("Failed to configure SMTP"),
    };

    let message = format!("Email sent successfully to {}", recipients.join(", "));
    service::share_summary(
        &db,
        mailer.as_ref().map(|m| m as &dyn Mailer),
        &summary.id,
        recipients,
    )
    .await?;

    println!("{}", message);
    Ok(())
}

/// List recent summaries
pub async fn list_summaries(settings: &Settings, limit: usize) -> Result<()> {
    let db = Database::open(settings)?;
    let summaries = db.list_summaries(limit)?;

    if summaries.is_empty() {
        println!("No summaries found");
        return Ok(());
    }

    println!("{:<10} {:<10} {:<17} {:<40}", "ID", "Transcript", "Date", "Summary");
    println!("{}", "-".repeat(80));

    for summary in summaries {
        let date = summary.created_at.format("%Y-%m-%d %H:%M");
        let first_line = summary.editable_text.lines().next().unwrap_or("");
        println!(
            "{:<10} {:<10} {:<17} {:<40}",
            short_id(&summary.id),
            short_id(&summary.transcript_id),
            date,
            truncate(first_line, 40)
        );
    }

    let stats = db.get_stats()?;
    println!();
    println!(
        "Transcripts: {}  Summaries: {}  Shares: {}",
        stats.total_transcripts, stats.total_summaries, stats.total_shares
    );

    Ok(())
}

/// Configuration management
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn find_summary(db: &Database, summary_id: &str) -> Result<Summary> {
    let id = db
        .find_summary_id(summary_id)?
        .context("Summary not found")?;
    Ok(service::get_summary(db, &id)?)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_summary(structured: &serde_json::Value, editable_text: &str) {
    let sections = StructuredSummary::from_value(structured);
    if !sections.is_empty() {
        for (name, items) in sections.sections() {
            if items.is_empty() {
                continue;
            }
            println!("{}:", section_title(name));
            for item in items {
                println!("  - {}", item);
            }
        }
        println!();
    }

    println!("{}", editable_text);
}

fn section_title(key: &str) -> String {
    let words = key.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
