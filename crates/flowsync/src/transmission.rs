//! Export of submitted form instances and upload of queued files.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::{stream, StreamExt};
use serde::Serialize;

use flowsync_core::form::{
    build_form_instance_metadata, ExportContext, FormInstance, FormInstanceStatus, DATA_FILE_NAME,
};
use flowsync_core::storage::{
    FormInstanceRepository, FormRepository, ResponseRepository, TransmissionRepository,
};
use flowsync_core::sync::{FlowApi, ObjectStore, SyncError};
use flowsync_core::transmission::{S3File, Transmission, TransmissionStatus, DATA_FOLDER};

use crate::archive;

/// Storage needed to export and upload form instances.
pub trait TransmissionStore:
    FormInstanceRepository + ResponseRepository + TransmissionRepository + FormRepository
{
}

impl<T> TransmissionStore for T where
    T: FormInstanceRepository + ResponseRepository + TransmissionRepository + FormRepository
{
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Archives written to the outbox.
    pub exported: Vec<String>,
    /// Instances with incomplete metadata.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub sent: usize,
    pub failed: usize,
    /// Form instances whose files are all uploaded.
    pub completed_instances: usize,
    /// Files the server reported missing, queued again.
    pub requeued: usize,
    /// Forms the server reported deleted.
    pub deleted_forms: usize,
}

/// Packages submitted form instances and pushes their files to the server.
pub struct TransmissionManager {
    store: Arc<dyn TransmissionStore>,
    api: Arc<dyn FlowApi>,
    objects: Arc<dyn ObjectStore>,
    context: ExportContext,
    outbox_dir: PathBuf,
    media_dir: PathBuf,
    concurrency: usize,
}

impl TransmissionManager {
    pub fn new(
        store: Arc<dyn TransmissionStore>,
        api: Arc<dyn FlowApi>,
        objects: Arc<dyn ObjectStore>,
        context: ExportContext,
        outbox_dir: impl Into<PathBuf>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            api,
            objects,
            context,
            outbox_dir: outbox_dir.into(),
            media_dir: media_dir.into(),
            concurrency: 1,
        }
    }

    /// Maximum uploads in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Writes `<uuid>.zip` for every submitted instance and queues its files.
    ///
    /// A failing instance is logged and the rest are still exported.
    pub async fn export_submitted(&self) -> Result<ExportReport, SyncError> {
        let instances = self
            .store
            .get_form_instances_by_status(FormInstanceStatus::Submitted)
            .await?;
        let mut report = ExportReport::default();

        for instance in &instances {
            match self.export(instance).await {
                Ok(Some(zip)) => report.exported.push(zip),
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(uuid = %instance.uuid, error = %e, "Failed to export form instance");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            exported = report.exported.len(),
            skipped = report.skipped,
            failed = report.failed,
            "Exported submitted form instances"
        );
        Ok(report)
    }

    async fn export(&self, instance: &FormInstance) -> Result<Option<String>, SyncError> {
        let id = instance
            .id
            .ok_or(SyncError::MissingParameter("formInstanceId"))?;

        let responses = self.store.get_responses(id).await?;
        let metadata = build_form_instance_metadata(instance, &responses, &self.context)
            .map_err(|e| SyncError::Io(format!("cannot serialize form instance: {e}")))?;
        if !metadata.is_valid() {
            tracing::warn!(uuid = %instance.uuid, "Form instance metadata is incomplete");
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.outbox_dir).await?;
        let path = self.outbox_dir.join(&metadata.zip_file_name);
        let data = metadata.form_instance_data.into_bytes();
        tokio::task::spawn_blocking(move || archive::write_single_entry(&path, DATA_FILE_NAME, &data))
            .await
            .map_err(|e| SyncError::Io(e.to_string()))?
            .map_err(|e| SyncError::Io(format!("cannot write archive: {e}")))?;

        let mut filenames = vec![metadata.zip_file_name.clone()];
        filenames.extend(metadata.media_file_names);
        self.store
            .create_transmissions(id, &metadata.form_id, &filenames)
            .await?;
        // Stays submitted until queued, so a failed export is picked up again.
        self.store
            .update_form_instance_status(id, FormInstanceStatus::Requested)
            .await?;

        tracing::debug!(uuid = %instance.uuid, files = filenames.len(), "Queued transmissions");
        Ok(Some(metadata.zip_file_name))
    }

    /// Uploads every unsynced transmission, then closes fully sent instances.
    ///
    /// Files the server reports missing are queued again first.
    pub async fn sync_transmissions(&self) -> Result<UploadSummary, SyncError> {
        let mut summary = UploadSummary::default();
        match self.check_pending_files().await {
            Ok((requeued, deleted_forms)) => {
                summary.requeued = requeued;
                summary.deleted_forms = deleted_forms;
            }
            Err(e) => tracing::error!(error = %e, "Could not retrieve missing files"),
        }

        let pending = self.store.get_unsynced_transmissions().await?;

        let outcomes: Vec<(i64, bool)> = stream::iter(pending)
            .map(|transmission| async move {
                let sent = self.transmit(&transmission).await;
                (transmission.form_instance_id, sent)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut touched = BTreeSet::new();
        for (form_instance_id, sent) in outcomes {
            if sent {
                summary.sent += 1;
            } else {
                summary.failed += 1;
            }
            touched.insert(form_instance_id);
        }

        for form_instance_id in touched {
            match self.complete_if_sent(form_instance_id).await {
                Ok(true) => summary.completed_instances += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(form_instance_id, error = %e, "Failed to close form instance")
                }
            }
        }

        tracing::info!(
            sent = summary.sent,
            failed = summary.failed,
            "Finished uploading transmissions"
        );
        Ok(summary)
    }

    /// Asks the server which files of the installed forms it never received.
    async fn check_pending_files(&self) -> Result<(usize, usize), SyncError> {
        let form_ids: Vec<String> = self
            .store
            .get_forms()
            .await?
            .into_iter()
            .map(|form| form.id)
            .collect();
        if form_ids.is_empty() {
            return Ok((0, 0));
        }

        let pending = self.api.download_pending_files(&form_ids).await?;
        if pending.is_empty() {
            return Ok((0, 0));
        }
        let missing: Vec<String> = pending.missing_file_names().into_iter().collect();
        let requeued = self.store.requeue_files(&missing).await?;
        let deleted = self.store.mark_forms_deleted(&pending.deleted_forms).await?;

        tracing::info!(
            missing = missing.len(),
            requeued,
            deleted,
            "Applied device notification"
        );
        Ok((requeued, deleted))
    }

    /// Uploads one file. Any failure marks the transmission failed.
    async fn transmit(&self, transmission: &Transmission) -> bool {
        let Some(id) = transmission.id else {
            return false;
        };
        match self.upload(id, transmission).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(filename = %transmission.filename, error = %e, "Upload failed");
                if let Err(e) = self
                    .store
                    .update_transmission_status(id, TransmissionStatus::Failed)
                    .await
                {
                    tracing::error!(filename = %transmission.filename, error = %e, "Failed to mark transmission failed");
                }
                false
            }
        }
    }

    async fn upload(&self, id: i64, transmission: &Transmission) -> Result<(), SyncError> {
        let file = S3File::classify(&transmission.filename)
            .ok_or(SyncError::MissingParameter("filename"))?;
        let path = self.local_path(&file);
        if !path.is_file() {
            return Err(SyncError::Io(format!("{} not found", path.display())));
        }

        self.store
            .update_transmission_status(id, TransmissionStatus::Requested)
            .await?;
        self.objects
            .upload_file(&file, &transmission.form_id, &path)
            .await?;
        self.api
            .notify_file_available(file.action, &transmission.form_id, &file.filename)
            .await?;
        self.store
            .update_transmission_status(id, TransmissionStatus::Sent)
            .await?;
        Ok(())
    }

    fn local_path(&self, file: &S3File) -> PathBuf {
        if file.folder == DATA_FOLDER {
            self.outbox_dir.join(&file.filename)
        } else {
            self.media_dir.join(&file.filename)
        }
    }

    async fn complete_if_sent(&self, form_instance_id: i64) -> Result<bool, SyncError> {
        let transmissions = self.store.get_transmissions(form_instance_id).await?;
        if transmissions
            .iter()
            .any(|t| t.status != TransmissionStatus::Sent)
        {
            return Ok(false);
        }
        let Some(instance) = self.store.get_form_instance(form_instance_id).await? else {
            return Ok(false);
        };
        if !instance.status.can_transition_to(FormInstanceStatus::Sent) {
            return Ok(false);
        }
        self.store
            .update_form_instance_status(form_instance_id, FormInstanceStatus::Sent)
            .await?;
        Ok(true)
    }
}
