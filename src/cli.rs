mod format;

use crate::campaign::DEFAULT_HISTORY_LIMIT;
use clap::{ArgAction, Parser, Subcommand};
pub use format::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// Build, inspect and convert audience segment rules for the CRM backend
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SEGMENT_RULES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the output to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Print diagnostics to stderr (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress warnings and diagnostics
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a file of rule rows into a segment document
    Compile {
        /// JSON array of {field, op, value} rows
        rows: PathBuf,
    },
    /// Expand a segment document (or a {"rules": ...} response) into rule rows
    Decompile {
        /// Segment document JSON
        document: PathBuf,

        /// Existing rows to append the decompiled rows to
        #[arg(long)]
        onto: Option<PathBuf>,

        /// Discard the --onto rows instead of appending to them
        #[arg(long, requires = "onto")]
        replace: bool,
    },
    /// Show how a value is coerced for an operator
    Coerce {
        /// Operator, e.g. $gte, in, notIn
        #[arg(long, default_value = "$eq")]
        op: String,

        /// Raw value as typed in the rule editor
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Build the body of an audience preview request
    Preview {
        /// JSON array of rule rows
        rows: PathBuf,

        /// Number of customers to preview (defaults to the configured limit)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Validate a campaign and build the body of its create request
    Campaign {
        /// JSON array of rule rows
        rows: PathBuf,

        /// Campaign name
        #[arg(long)]
        name: String,

        /// Message template, supports {{name}} (defaults to the configured message)
        #[arg(long)]
        message: Option<String>,

        /// Id of the creating user (defaults to the configured user)
        #[arg(long)]
        created_by: Option<String>,
    },
    /// Build a status update body, checking the campaign lifecycle
    Status {
        /// Current status (draft, running, completed)
        from: String,

        /// Requested status
        to: String,
    },
    /// Render a saved audience preview response
    ShowPreview {
        /// Preview response JSON
        response: PathBuf,

        /// Message template to personalise for each customer
        #[arg(long)]
        message: Option<String>,
    },
    /// Render a saved campaign list response
    History {
        /// Campaign list response JSON
        response: PathBuf,

        /// Page the response was fetched for (pages start at 1)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Campaigns per page
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
