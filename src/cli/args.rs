//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::service::DEFAULT_INSTRUCTION;

/// recap - Meeting transcript summaries you can edit and email
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to listen on (overrides server.addr)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Store a transcript and print its ID
    Upload {
        /// Transcript file ("-" reads stdin)
        file: PathBuf,
    },

    /// Summarize a stored transcript
    Summarize {
        /// Transcript ID or ID prefix
        transcript_id: String,

        /// Custom instruction passed to every generation call
        #[arg(short, long, default_value = DEFAULT_INSTRUCTION)]
        instruction: String,
    },

    /// Summarize a transcript file without storing anything
    Digest {
        /// Transcript file ("-" reads stdin)
        file: PathBuf,

        /// Custom instruction passed to every generation call
        #[arg(short, long, default_value = DEFAULT_INSTRUCTION)]
        instruction: String,

        /// Print the structured sections and text as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a summary
    Show {
        /// Summary ID or ID prefix
        summary_id: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a summary's editable text
    Edit {
        /// Summary ID or ID prefix
        summary_id: String,

        /// New text
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the new text from a file ("-" reads stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Email a summary's editable text
    Share {
        /// Summary ID or ID prefix
        summary_id: String,

        /// Recipient addresses
        #[arg(required = true)]
        recipients: Vec<String>,
    },

    /// List recent summaries
    List {
        /// Maximum number of summaries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
