//! Form definition updates.

use std::path::PathBuf;
use std::sync::Arc;

use flowsync_core::bootstrap::EntryKind;
use flowsync_core::form::{FormHeader, InstalledForm};
use flowsync_core::storage::FormRepository;
use flowsync_core::sync::{FlowApi, ObjectStore, SyncError};
use serde::Serialize;

use crate::archive;

/// What an update pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstallReport {
    pub installed: Vec<InstalledForm>,
    pub up_to_date: usize,
    /// Ids of forms whose archive could not be installed.
    pub failed: Vec<String>,
}

/// Keeps installed form definitions in line with the server.
pub struct FormUpdater {
    api: Arc<dyn FlowApi>,
    forms: Arc<dyn FormRepository>,
    objects: Arc<dyn ObjectStore>,
    forms_dir: PathBuf,
    resources_dir: PathBuf,
}

impl FormUpdater {
    pub fn new(
        api: Arc<dyn FlowApi>,
        forms: Arc<dyn FormRepository>,
        objects: Arc<dyn ObjectStore>,
        forms_dir: impl Into<PathBuf>,
        resources_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api,
            forms,
            objects,
            forms_dir: forms_dir.into(),
            resources_dir: resources_dir.into(),
        }
    }

    pub async fn download_form_headers(&self) -> Result<Vec<FormHeader>, SyncError> {
        Ok(self.api.download_form_headers().await?)
    }

    /// Installs every form that is new or has a newer version on the server.
    ///
    /// A form that fails to install is logged and skipped; the others still install.
    pub async fn install_updates(&self) -> Result<InstallReport, SyncError> {
        let headers = self.download_form_headers().await?;
        let mut report = InstallReport::default();

        for header in &headers {
            let current = self.forms.get_form(&header.id).await?;
            if current.is_some_and(|form| form.version >= header.version) {
                report.up_to_date += 1;
                continue;
            }
            match self.install(header).await {
                Ok(form) => {
                    tracing::info!(form_id = %form.id, version = form.version, "Installed form");
                    report.installed.push(form);
                }
                Err(e) => {
                    tracing::error!(form_id = %header.id, error = %e, "Failed to install form");
                    report.failed.push(header.id.clone());
                }
            }
        }
        Ok(report)
    }

    /// Installs one form when the server has a newer version of it.
    pub async fn update_form(&self, form_id: &str) -> Result<InstallReport, SyncError> {
        let header = self.api.download_form_header(form_id).await?;
        let mut report = InstallReport::default();

        let current = self.forms.get_form(&header.id).await?;
        if current.is_some_and(|form| form.version >= header.version) {
            report.up_to_date += 1;
            return Ok(report);
        }
        let form = self.install(&header).await?;
        tracing::info!(form_id = %form.id, version = form.version, "Installed form");
        report.installed.push(form);
        Ok(report)
    }

    /// Downloads `<id>.zip` and extracts its definition and cascade resources.
    pub async fn install(&self, header: &FormHeader) -> Result<InstalledForm, SyncError> {
        let bytes = self
            .objects
            .download_archive(&format!("{}.zip", header.id))
            .await?;

        let forms_dir = self.forms_dir.clone();
        let resources_dir = self.resources_dir.clone();
        let definition = tokio::task::spawn_blocking(move || -> Result<Option<String>, SyncError> {
            let entries = archive::read_entries_from_bytes(&bytes)
                .map_err(|e| SyncError::Io(format!("invalid form archive: {e}")))?;
            archive::extract_entries(&entries, &forms_dir, &resources_dir)?;
            Ok(entries
                .iter()
                .find(|entry| entry.kind == EntryKind::SurveyDefinition)
                .map(|entry| entry.file_name().to_string()))
        })
        .await
        .map_err(|e| SyncError::Io(e.to_string()))??;

        let mut form = InstalledForm::from_header(header);
        match definition {
            Some(file_name) => form.file_name = file_name,
            None => tracing::warn!(form_id = %header.id, "Form archive has no definition"),
        }
        self.forms.save_form(&form).await?;
        Ok(form)
    }

    /// Installed forms whose current version the user has not been told about.
    pub async fn forms_needing_notification(&self) -> Result<Vec<InstalledForm>, SyncError> {
        let mut pending = Vec::new();
        for form in self.forms.get_forms().await? {
            if !self.forms.was_version_notified(&form.id, form.version).await? {
                pending.push(form);
            }
        }
        Ok(pending)
    }

    pub async fn mark_notified(&self, forms: &[InstalledForm]) -> Result<(), SyncError> {
        for form in forms {
            self.forms.set_version_notified(&form.id, form.version).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::storage::SqliteStore;
    use crate::testing::{FakeApi, FakeObjectStore};

    fn header(id: &str, version: f64) -> FormHeader {
        FormHeader {
            id: id.to_string(),
            name: format!("Form {id}"),
            language: "en".to_string(),
            version,
            group_id: 77,
            group_name: "Wells".to_string(),
            monitored: true,
            registration_form_id: id.to_string(),
        }
    }

    struct Fixture {
        store: Arc<SqliteStore>,
        dir: tempfile::TempDir,
        updater: FormUpdater,
    }

    async fn fixture(headers: Vec<FormHeader>, remote: &[(&str, &[u8])]) -> Fixture {
        let store = Arc::new(SqliteStore::new_in_memory().await.unwrap());
        let dir = tempfile::tempdir().unwrap();
        let forms_dir = dir.path().join("forms");
        let updater = FormUpdater::new(
            Arc::new(FakeApi::with_headers(headers)),
            store.clone(),
            Arc::new(FakeObjectStore::with_remote(remote)),
            &forms_dir,
            forms_dir.join("res"),
        );
        Fixture {
            store,
            dir,
            updater,
        }
    }

    #[tokio::test]
    async fn test_installs_new_forms_and_resources() {
        let archive = zip_bytes(&[
            ("1001.xml", b"<survey surveyId=\"1001\"/>"),
            ("cascade-1.sqlite", b"db"),
        ]);
        let f = fixture(vec![header("1001", 2.0)], &[("1001.zip", archive.as_slice())]).await;

        let report = f.updater.install_updates().await.unwrap();

        assert_eq!(report.installed.len(), 1);
        assert!(report.failed.is_empty());
        let forms_dir = f.dir.path().join("forms");
        assert!(forms_dir.join("1001.xml").is_file());
        assert!(forms_dir.join("res/cascade-1.sqlite").is_file());

        let form = f.store.get_form("1001").await.unwrap().unwrap();
        assert_eq!(form.version, 2.0);
        assert_eq!(form.file_name, "1001.xml");
    }

    #[tokio::test]
    async fn test_skips_forms_already_up_to_date() {
        let f = fixture(vec![header("1001", 2.0)], &[]).await;
        f.store
            .save_form(&InstalledForm::from_header(&header("1001", 2.0)))
            .await
            .unwrap();

        let report = f.updater.install_updates().await.unwrap();

        assert_eq!(report.up_to_date, 1);
        assert!(report.installed.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_install_does_not_stop_others() {
        let archive = zip_bytes(&[("2002.xml", b"<survey/>")]);
        let f = fixture(
            vec![header("1001", 1.0), header("2002", 1.0)],
            &[("2002.zip", archive.as_slice())],
        )
        .await;

        let report = f.updater.install_updates().await.unwrap();

        assert_eq!(report.failed, vec!["1001".to_string()]);
        assert_eq!(report.installed[0].id, "2002");
    }

    #[tokio::test]
    async fn test_update_single_form() {
        let archive = zip_bytes(&[("1001.xml", b"<survey surveyId=\"1001\"/>")]);
        let f = fixture(
            vec![header("1001", 3.0), header("2002", 1.0)],
            &[("1001.zip", archive.as_slice())],
        )
        .await;
        f.store
            .save_form(&InstalledForm::from_header(&header("1001", 2.0)))
            .await
            .unwrap();

        let report = f.updater.update_form("1001").await.unwrap();

        assert_eq!(report.installed.len(), 1);
        assert_eq!(f.store.get_form("1001").await.unwrap().unwrap().version, 3.0);
        assert!(f.store.get_form("2002").await.unwrap().is_none());

        let again = f.updater.update_form("1001").await.unwrap();
        assert_eq!(again.up_to_date, 1);
        assert!(again.installed.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_form_fails() {
        let f = fixture(vec![], &[]).await;

        let err = f.updater.update_form("404").await.unwrap_err();

        assert!(matches!(err, SyncError::Transport(_)));
    }

    #[tokio::test]
    async fn test_notification_list_shrinks_once_marked() {
        let f = fixture(vec![], &[]).await;
        f.store
            .save_form(&InstalledForm::from_header(&header("1001", 3.0)))
            .await
            .unwrap();

        let pending = f.updater.forms_needing_notification().await.unwrap();
        assert_eq!(pending.len(), 1);

        f.updater.mark_notified(&pending).await.unwrap();

        assert!(f.updater.forms_needing_notification().await.unwrap().is_empty());
    }
}
