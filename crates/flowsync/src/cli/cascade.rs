//! Cascade CLI commands.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
pub struct CascadeCommand {
    #[command(subcommand)]
    pub action: CascadeAction,
}

#[derive(Debug, Subcommand)]
pub enum CascadeAction {
    /// List the children of a cascade level.
    Children {
        /// Resource name, with or without `.sqlite`.
        #[arg(long)]
        src: String,
        /// Parent node id. Defaults to the top level.
        #[arg(long, default_value_t = flowsync_core::cascade::ROOT_PARENT_ID)]
        parent: i64,
    },
}
