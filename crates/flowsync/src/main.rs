mod archive;
mod bootstrap;
mod cascade;
mod cli;
mod commands;
mod config;
mod forms;
mod output;
mod scope;
mod storage;
mod sync;
mod transmission;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::cascade::CascadeAction;
use crate::cli::repetitions::RepetitionsAction;
use crate::cli::responses::ResponsesAction;
use crate::cli::sync::SyncAction;
use crate::cli::{Cli, Commands, LogFormat};
use crate::output::{pretty, print};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.config();
    let format = cli.format;

    match cli.command {
        Commands::Sync(sync_cmd) => match sync_cmd.action {
            SyncAction::Datapoints { survey } => {
                let result = commands::sync_datapoints(&config, survey).await?;
                print(&result, format, pretty::format_download_result);
            }
            SyncAction::Forms { form } => {
                let sync = commands::sync_forms(&config, form.as_deref()).await?;
                print(&sync, format, pretty::format_forms_sync);
            }
        },
        Commands::Export { username, email } => {
            let report = commands::export(&config, username, email).await?;
            print(&report, format, pretty::format_export_report);
        }
        Commands::Upload => {
            let summary = commands::upload(&config).await?;
            print(&summary, format, pretty::format_upload_summary);
        }
        Commands::Bootstrap => {
            let outcomes = commands::bootstrap(&config).await?;
            print(&outcomes, format, |o| pretty::format_bundles(o));
        }
        Commands::Cascade(cascade_cmd) => match cascade_cmd.action {
            CascadeAction::Children { src, parent } => {
                let children = commands::cascade_children(&config, src, parent).await?;
                print(&children, format, pretty::format_cascade_children);
            }
        },
        Commands::Repetitions(repetitions_cmd) => {
            let store = commands::open_store(&config).await?;
            match repetitions_cmd.action {
                RepetitionsAction::List(group) => {
                    let repetitions =
                        commands::list_repetitions(store.as_ref(), group.instance, &group.questions)
                            .await?;
                    print(&repetitions, format, |r| pretty::format_repetitions(r));
                }
                RepetitionsAction::Add(group) => {
                    let added =
                        commands::add_repetition(store.as_ref(), group.instance, &group.questions)
                            .await?;
                    print(&added, format, pretty::format_new_repetition);
                }
                RepetitionsAction::Delete { group, iteration } => {
                    let deleted = commands::delete_repetition(
                        store.as_ref(),
                        group.instance,
                        &group.questions,
                        iteration,
                    )
                    .await?;
                    print(&deleted, format, pretty::format_deleted_repetition);
                }
            }
        }
        Commands::Responses(responses_cmd) => {
            let store = commands::open_store(&config).await?;
            match responses_cmd.action {
                ResponsesAction::Save(args) => {
                    let saved =
                        commands::save_answer(store.as_ref(), args.target()?, args.answer()).await?;
                    print(&saved, format, pretty::format_saved_answer);
                }
            }
        }
        Commands::Submit { instance, duration } => {
            let store = commands::open_store(&config).await?;
            let submitted = commands::submit_instance(store.as_ref(), instance, duration).await?;
            print(&submitted, format, pretty::format_submitted);
        }
        Commands::ServerTime => {
            let time = commands::flow_client(&config)
                .get_server_time()
                .await
                .context("Failed to fetch server time")?;
            print(&time, format, pretty::format_server_time);
        }
        Commands::ApkVersion => {
            let apk = commands::flow_client(&config)
                .get_apk_data()
                .await
                .context("Failed to fetch app version")?;
            print(&apk, format, pretty::format_apk);
        }
    }

    Ok(())
}

fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flowsync=info,flowsync_client=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
