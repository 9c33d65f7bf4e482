//! CLI command definitions.

pub mod cascade;
pub mod repetitions;
pub mod responses;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;

/// Offline survey response sync for Akvo Flow.
#[derive(Debug, Parser)]
#[command(name = "flowsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Flow server base URL.
    #[arg(long, global = true, env = "FLOW_SERVER_URL")]
    pub server_url: Option<String>,

    /// Instance name.
    #[arg(long, global = true, env = "FLOW_INSTANCE")]
    pub instance: Option<String>,

    /// Root of the local file tree.
    #[arg(long, global = true, env = "FLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// SQLite database path.
    #[arg(long, global = true, env = "SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Log format.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with command line overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(server_url) = &self.server_url {
            config.server_url = server_url.clone();
        }
        if let Some(instance) = &self.instance {
            config.instance = instance.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(sqlite_path) = &self.sqlite_path {
            config.sqlite_path = sqlite_path.clone();
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download data from the server.
    Sync(sync::SyncCommand),
    /// Package submitted form instances for upload.
    Export {
        /// Username stamped on exported data.
        #[arg(long, env = "FLOW_USERNAME", default_value = "")]
        username: String,
        /// Email stamped on exported data.
        #[arg(long, env = "FLOW_EMAIL", default_value = "")]
        email: String,
    },
    /// Upload queued archives and media.
    Upload,
    /// Apply bundles from the bootstrap directory.
    Bootstrap,
    /// Browse cascade resources.
    Cascade(cascade::CascadeCommand),
    /// Inspect and edit repeatable group iterations.
    Repetitions(repetitions::RepetitionsCommand),
    /// Answer questions of a draft.
    Responses(responses::ResponsesCommand),
    /// Mark a draft as submitted.
    Submit {
        /// Form instance row id.
        #[arg(long)]
        instance: i64,
        /// Time spent filling the form, in seconds.
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },
    /// Show the server clock.
    ServerTime,
    /// Show the latest published app version.
    ApkVersion,
}
