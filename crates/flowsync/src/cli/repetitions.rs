//! Repeatable group CLI commands.

use clap::{Args, Parser, Subcommand};

/// Repeatable group commands.
#[derive(Debug, Parser)]
pub struct RepetitionsCommand {
    #[command(subcommand)]
    pub action: RepetitionsAction,
}

/// The group a command works on.
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Form instance row id.
    #[arg(long)]
    pub instance: i64,
    /// Question ids of the group, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub questions: Vec<String>,
}

/// Available repetition actions.
#[derive(Debug, Subcommand)]
pub enum RepetitionsAction {
    /// List repetitions with their answers.
    List(GroupArgs),
    /// Show the iteration a new repetition would get.
    Add(GroupArgs),
    /// Delete every answer of one repetition.
    Delete {
        #[command(flatten)]
        group: GroupArgs,
        /// Iteration to delete.
        #[arg(long)]
        iteration: i32,
    },
}
