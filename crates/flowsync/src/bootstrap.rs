//! Applies operator-supplied bundles of forms and cascade resources.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flowsync_core::bootstrap::{
    handled_file_name, is_pending_bundle, survey_id_from_entry, BootstrapError, EntryKind,
    ProcessingResult,
};
use flowsync_core::form::{InstalledForm, SurveyMetadata};
use flowsync_core::storage::FormRepository;
use serde::Serialize;

use crate::archive;

/// How one bundle was handled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleOutcome {
    pub file: String,
    #[serde(flatten)]
    pub result: ProcessingResult,
}

pub struct BootstrapProcessor {
    forms: Arc<dyn FormRepository>,
    instance: String,
    bootstrap_dir: PathBuf,
    forms_dir: PathBuf,
    resources_dir: PathBuf,
}

impl BootstrapProcessor {
    pub fn new(
        forms: Arc<dyn FormRepository>,
        instance: impl Into<String>,
        bootstrap_dir: impl Into<PathBuf>,
        forms_dir: impl Into<PathBuf>,
        resources_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            forms,
            instance: instance.into(),
            bootstrap_dir: bootstrap_dir.into(),
            forms_dir: forms_dir.into(),
            resources_dir: resources_dir.into(),
        }
    }

    /// Applies pending bundles in name order, one at a time.
    ///
    /// Each handled bundle is renamed with `.processed` or `.error`. The first failure
    /// stops the batch and leaves later bundles untouched.
    pub async fn process(&self) -> Result<Vec<BundleOutcome>, BootstrapError> {
        let mut outcomes = Vec::new();
        for name in self.pending_bundles()? {
            let path = self.bootstrap_dir.join(&name);
            let result = match self.apply(&name, &path).await {
                Ok(count) => {
                    tracing::info!(bundle = %name, forms = count, "Applied bootstrap bundle");
                    ProcessingResult::Success
                }
                Err(BootstrapError::WrongDashboard(_)) => {
                    tracing::error!(bundle = %name, instance = %self.instance, "Bundle is for another instance");
                    ProcessingResult::WrongDashboard
                }
                Err(e) => {
                    tracing::error!(bundle = %name, error = %e, "Failed to apply bootstrap bundle");
                    ProcessingResult::Failure(e.to_string())
                }
            };

            let handled = self.bootstrap_dir.join(handled_file_name(&name, &result));
            tokio::fs::rename(&path, &handled).await?;

            let success = result.is_success();
            outcomes.push(BundleOutcome { file: name, result });
            if !success {
                break;
            }
        }
        Ok(outcomes)
    }

    fn pending_bundles(&self) -> std::io::Result<Vec<String>> {
        if !self.bootstrap_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.bootstrap_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_pending_bundle(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Extracts a bundle and records its forms. Returns the number of forms recorded.
    async fn apply(&self, name: &str, path: &Path) -> Result<usize, BootstrapError> {
        let bundle = name.to_string();
        let path = path.to_path_buf();
        let instance = self.instance.clone();
        let forms_dir = self.forms_dir.clone();
        let resources_dir = self.resources_dir.clone();

        let forms = tokio::task::spawn_blocking(move || {
            extract_bundle(&bundle, &path, &instance, &forms_dir, &resources_dir)
        })
        .await
        .map_err(|e| BootstrapError::InvalidBundle {
            file: name.to_string(),
            reason: e.to_string(),
        })??;

        for form in &forms {
            self.forms
                .save_form(form)
                .await
                .map_err(|e| BootstrapError::InvalidBundle {
                    file: name.to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(forms.len())
    }
}

/// Checks every definition in the bundle, then extracts it.
///
/// Nothing is written when any definition is invalid or belongs to another instance.
fn extract_bundle(
    bundle: &str,
    path: &Path,
    instance: &str,
    forms_dir: &Path,
    resources_dir: &Path,
) -> Result<Vec<InstalledForm>, BootstrapError> {
    let invalid = |reason: String| BootstrapError::InvalidBundle {
        file: bundle.to_string(),
        reason,
    };

    let entries = archive::read_entries(File::open(path)?).map_err(|e| invalid(e.to_string()))?;

    let mut forms = Vec::new();
    for entry in entries.iter().filter(|e| e.kind == EntryKind::SurveyDefinition) {
        let xml = std::str::from_utf8(&entry.contents)
            .map_err(|e| invalid(format!("{}: {e}", entry.path)))?;
        let metadata =
            SurveyMetadata::parse(xml).map_err(|e| invalid(format!("{}: {e}", entry.path)))?;
        if !metadata.belongs_to(instance) {
            return Err(BootstrapError::WrongDashboard(bundle.to_string()));
        }
        forms.push(metadata.into_installed(
            &survey_id_from_entry(&entry.path),
            entry.file_name().to_string(),
        ));
    }

    archive::extract_entries(&entries, forms_dir, resources_dir)?;
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::storage::SqliteStore;

    const INSTANCE: &str = "akvoflow-1";

    fn survey_xml(app: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><survey surveyId="1001" name="Wells" version="3.0" app="{app}" surveyGroupId="77"><question id="1"/></survey>"#
        )
    }

    struct Fixture {
        dir: tempfile::TempDir,
        store: Arc<SqliteStore>,
        processor: BootstrapProcessor,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(SqliteStore::new_in_memory().await.unwrap());
            let bootstrap = dir.path().join("bootstrap");
            std::fs::create_dir_all(&bootstrap).unwrap();
            let forms = dir.path().join("forms");
            let processor =
                BootstrapProcessor::new(store.clone(), INSTANCE, &bootstrap, &forms, forms.join("res"));
            Self {
                dir,
                store,
                processor,
            }
        }

        fn bundle(&self, name: &str, files: &[(&str, &[u8])]) {
            std::fs::write(self.dir.path().join("bootstrap").join(name), zip_bytes(files)).unwrap();
        }

        fn bootstrap_file(&self, name: &str) -> PathBuf {
            self.dir.path().join("bootstrap").join(name)
        }
    }

    #[tokio::test]
    async fn test_bundle_is_applied_and_marked_processed() {
        let f = Fixture::new().await;
        let xml = survey_xml(INSTANCE);
        f.bundle(
            "a.zip",
            &[("1001/1001.xml", xml.as_bytes()), ("cascade-1.sqlite", b"db")],
        );

        let outcomes = f.processor.process().await.unwrap();

        assert_eq!(
            outcomes,
            vec![BundleOutcome {
                file: "a.zip".to_string(),
                result: ProcessingResult::Success,
            }]
        );
        assert!(f.bootstrap_file("a.zip.processed").is_file());
        assert!(!f.bootstrap_file("a.zip").exists());
        assert!(f.dir.path().join("forms/1001.xml").is_file());
        assert!(f.dir.path().join("forms/res/cascade-1.sqlite").is_file());

        let form = f.store.get_form("1001").await.unwrap().unwrap();
        assert_eq!(form.name, "Wells");
        assert_eq!(form.version, 3.0);
        assert_eq!(form.group_id, Some(77));
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_batch() {
        let f = Fixture::new().await;
        let ok = survey_xml(INSTANCE);
        let foreign = survey_xml("akvoflow-other");
        f.bundle("a.zip", &[("1001.xml", ok.as_bytes())]);
        f.bundle("b.zip", &[("2002.xml", foreign.as_bytes())]);
        f.bundle("c.zip", &[("3003.xml", ok.as_bytes())]);

        let outcomes = f.processor.process().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].result, ProcessingResult::WrongDashboard);
        assert!(f.bootstrap_file("a.zip.processed").is_file());
        assert!(f.bootstrap_file("b.zip.error").is_file());
        assert!(f.bootstrap_file("c.zip").is_file());
        assert!(!f.dir.path().join("forms/2002.xml").exists());
    }

    #[tokio::test]
    async fn test_corrupt_bundle_fails() {
        let f = Fixture::new().await;
        std::fs::write(f.bootstrap_file("bad.zip"), b"not a zip").unwrap();

        let outcomes = f.processor.process().await.unwrap();

        assert!(matches!(outcomes[0].result, ProcessingResult::Failure(_)));
        assert!(f.bootstrap_file("bad.zip.error").is_file());
    }

    #[tokio::test]
    async fn test_handled_bundles_are_not_reprocessed() {
        let f = Fixture::new().await;
        std::fs::write(f.bootstrap_file("old.zip.processed"), b"").unwrap();
        std::fs::write(f.bootstrap_file("notes.txt"), b"").unwrap();

        let outcomes = f.processor.process().await.unwrap();

        assert!(outcomes.is_empty());
    }
}
