//! Sync CLI commands.

use clap::{Parser, Subcommand};

/// Download commands.
#[derive(Debug, Parser)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub action: SyncAction,
}

/// Available sync actions.
#[derive(Debug, Subcommand)]
pub enum SyncAction {
    /// Download assigned data points of a survey.
    Datapoints {
        /// Survey id.
        #[arg(long)]
        survey: Option<i64>,
    },
    /// Install new and updated forms.
    Forms {
        /// Only check this form.
        #[arg(long)]
        form: Option<String>,
    },
}
