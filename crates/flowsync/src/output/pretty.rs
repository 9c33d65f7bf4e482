//! Pretty output formatting.

use flowsync_client::client::device::{ApkData, ServerTime};
use flowsync_core::bootstrap::ProcessingResult;
use flowsync_core::form::InstalledForm;
use flowsync_core::response::GroupRepetition;
use flowsync_core::sync::{DownloadResult, ResultCode};

use crate::bootstrap::BundleOutcome;
use crate::cascade::CascadeLoad;
use crate::commands::{
    CascadeChildren, DeletedRepetition, FormsSync, NewRepetition, SavedAnswer, SubmittedInstance,
};
use crate::forms::InstallReport;
use crate::transmission::{ExportReport, UploadSummary};

const RULE_WIDTH: usize = 40;

fn heading(title: &str, count: usize) -> String {
    format!("{title} ({count})\n{}", "-".repeat(RULE_WIDTH))
}

/// Format a data point download result for display.
pub fn format_download_result(result: &DownloadResult) -> String {
    match result.code {
        ResultCode::Success => format!("Downloaded {} data points.", result.count),
        ResultCode::ErrorNoNetwork => "No network connection. Nothing was downloaded.".to_string(),
        ResultCode::ErrorAssignmentMissing => {
            "This device is not assigned to the survey. Ask an administrator to assign it."
                .to_string()
        }
        ResultCode::ErrorGeneric => "Download failed. See the logs for details.".to_string(),
    }
}

/// Format an installed form for display.
pub fn format_form(form: &InstalledForm) -> String {
    format!(
        "{}\n  ID: {}\n  Version: {}\n  File: {}",
        form.name, form.id, form.version, form.file_name
    )
}

fn format_install_report(report: &InstallReport) -> String {
    let mut output = heading("INSTALLED", report.installed.len());
    for form in &report.installed {
        output.push_str(&format!("\n{}\n", format_form(form)));
    }
    output.push_str(&format!("\nUp to date: {}", report.up_to_date));
    if !report.failed.is_empty() {
        output.push_str(&format!("\nFailed: {}", report.failed.join(", ")));
    }
    output
}

/// Format a form sync for display.
pub fn format_forms_sync(sync: &FormsSync) -> String {
    let mut output = format_install_report(&sync.report);
    if !sync.updated.is_empty() {
        output.push_str("\n\nNew versions available:");
        for form in &sync.updated {
            output.push_str(&format!("\n  {} (v{})", form.name, form.version));
        }
    }
    output
}

pub fn format_export_report(report: &ExportReport) -> String {
    let mut output = heading("EXPORTED", report.exported.len());
    for zip in &report.exported {
        output.push_str(&format!("\n  {zip}"));
    }
    output.push_str(&format!(
        "\nSkipped: {}\nFailed: {}",
        report.skipped, report.failed
    ));
    output
}

pub fn format_upload_summary(summary: &UploadSummary) -> String {
    let mut output = format!(
        "Sent: {}\nFailed: {}\nCompleted form instances: {}",
        summary.sent, summary.failed, summary.completed_instances
    );
    if summary.requeued > 0 {
        output.push_str(&format!("\nRequeued missing files: {}", summary.requeued));
    }
    if summary.deleted_forms > 0 {
        output.push_str(&format!("\nForms deleted on server: {}", summary.deleted_forms));
    }
    output
}

pub fn format_saved_answer(saved: &SavedAnswer) -> String {
    let mut output = format!(
        "Saved {} = {:?} on form instance {}",
        saved.question, saved.value, saved.instance
    );
    if saved.created {
        output.push_str(" (new draft)");
    }
    if let Some(name) = &saved.data_point_name {
        output.push_str(&format!("\nData point name: {name}"));
    }
    output
}

pub fn format_submitted(submitted: &SubmittedInstance) -> String {
    format!(
        "Submitted form instance {} ({})\nDuration: {}s\nRun `flowsync export` to package it.",
        submitted.instance,
        submitted.uuid,
        submitted.duration_ms / 1000
    )
}

/// Format bootstrap outcomes for display.
pub fn format_bundles(outcomes: &[BundleOutcome]) -> String {
    if outcomes.is_empty() {
        return "No bundles to process.".to_string();
    }
    let mut output = heading("BUNDLES", outcomes.len());
    for outcome in outcomes {
        let status = match &outcome.result {
            ProcessingResult::Success => "processed".to_string(),
            ProcessingResult::WrongDashboard => "error: built for another instance".to_string(),
            ProcessingResult::Failure(reason) => format!("error: {reason}"),
        };
        output.push_str(&format!("\n  {} [{}]", outcome.file, status));
    }
    output
}

pub fn format_cascade_children(children: &CascadeChildren) -> String {
    match &children.outcome {
        CascadeLoad::Failed { reason } => format!("Cascade unavailable: {reason}"),
        CascadeLoad::Skipped => "No cascade resource given.".to_string(),
        CascadeLoad::Loaded { .. } if children.children.is_empty() => {
            format!("No children under {}.", children.parent)
        }
        CascadeLoad::Loaded { .. } => {
            let mut output = heading("NODES", children.children.len());
            for node in &children.children {
                output.push_str(&format!("\n  {} {}", node.id, node.name));
                if let Some(code) = &node.code {
                    output.push_str(&format!(" [{code}]"));
                }
            }
            output
        }
    }
}

/// Format repetitions with their answers for display.
pub fn format_repetitions(repetitions: &[GroupRepetition]) -> String {
    if repetitions.is_empty() {
        return "No repetitions.".to_string();
    }
    let mut output = String::new();
    for repetition in repetitions {
        output.push_str(&format!(
            "{} (iteration {})\n",
            repetition.header, repetition.iteration
        ));
        for response in &repetition.responses {
            output.push_str(&format!("  {}: {}\n", response.question_id, response.value));
        }
    }
    output.trim_end().to_string()
}

pub fn format_new_repetition(repetition: &NewRepetition) -> String {
    format!(
        "Repetition: {} gets iteration {}",
        repetition.position + 1,
        repetition.iteration
    )
}

pub fn format_deleted_repetition(deleted: &DeletedRepetition) -> String {
    format!(
        "Deleted iteration {} ({} answers). Remaining repetitions: {}",
        deleted.iteration, deleted.removed, deleted.remaining
    )
}

pub fn format_server_time(time: &ServerTime) -> String {
    format!("Server time: {}", time.time)
}

pub fn format_apk(apk: &ApkData) -> String {
    let mut output = format!("Version: {}\n  File: {}", apk.version, apk.file_name);
    if let Some(md5) = &apk.md5_checksum {
        output.push_str(&format!("\n  MD5: {md5}"));
    }
    output
}
