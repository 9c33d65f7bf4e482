//! Hand-written fakes for the network seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use flowsync_core::form::FormHeader;
use flowsync_core::sync::{
    ConnectivityCheck, DataPointPage, FlowApi, ObjectStore, PendingFiles, TransportError,
    TransportResult,
};
use flowsync_core::transmission::{NotifyAction, S3File};

/// Serves queued data point pages, then empty ones.
pub struct FakeApi {
    pub pages: Mutex<VecDeque<TransportResult<DataPointPage>>>,
    pub page_requests: Mutex<Vec<(i64, Option<String>)>>,
    pub headers: Vec<FormHeader>,
    pub notified: Mutex<Vec<(NotifyAction, String, String)>>,
    /// Served by the device notification. `None` fails the request.
    pub pending: Option<PendingFiles>,
    pub pending_requests: Mutex<Vec<Vec<String>>>,
    pub calls: AtomicUsize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            pages: Mutex::default(),
            page_requests: Mutex::default(),
            headers: Vec::new(),
            notified: Mutex::default(),
            pending: Some(PendingFiles::default()),
            pending_requests: Mutex::default(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeApi {
    pub fn with_pending(pending: Option<PendingFiles>) -> Self {
        Self {
            pending,
            ..Self::default()
        }
    }

    pub fn with_pages(pages: Vec<TransportResult<DataPointPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn with_headers(headers: Vec<FormHeader>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlowApi for FakeApi {
    async fn download_data_points(
        &self,
        survey_id: i64,
        cursor: Option<&str>,
    ) -> TransportResult<DataPointPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page_requests
            .lock()
            .unwrap()
            .push((survey_id, cursor.map(str::to_string)));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DataPointPage::default()))
    }

    async fn download_form_headers(&self) -> TransportResult<Vec<FormHeader>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.headers.clone())
    }

    async fn download_form_header(&self, form_id: &str) -> TransportResult<FormHeader> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.headers
            .iter()
            .find(|h| h.id == form_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(form_id.to_string()))
    }

    async fn notify_file_available(
        &self,
        action: NotifyAction,
        form_id: &str,
        filename: &str,
    ) -> TransportResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.notified
            .lock()
            .unwrap()
            .push((action, form_id.to_string(), filename.to_string()));
        Ok(())
    }

    async fn download_pending_files(&self, form_ids: &[String]) -> TransportResult<PendingFiles> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pending_requests.lock().unwrap().push(form_ids.to_vec());
        self.pending.clone().ok_or(TransportError::Http {
            status: 500,
            message: "Server Error".to_string(),
        })
    }
}

/// In-memory object storage.
#[derive(Default)]
pub struct FakeObjectStore {
    /// Remote files by name, served by every download method.
    pub remote: HashMap<String, Vec<u8>>,
    /// Uploads of these file names fail with a server error.
    pub failing_uploads: HashSet<String>,
    pub uploaded: Mutex<Vec<(String, &'static str, String)>>,
    pub downloads: AtomicUsize,
}

impl FakeObjectStore {
    pub fn with_remote(files: &[(&str, &[u8])]) -> Self {
        Self {
            remote: files
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                .collect(),
            ..Self::default()
        }
    }

    fn fetch(&self, filename: &str) -> TransportResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.remote
            .get(filename)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(filename.to_string()))
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload_file(&self, file: &S3File, form_id: &str, path: &Path) -> TransportResult<()> {
        if self.failing_uploads.contains(&file.filename) {
            return Err(TransportError::Http {
                status: 500,
                message: "boom".to_string(),
            });
        }
        if !path.is_file() {
            return Err(TransportError::Io(format!("{} missing", path.display())));
        }
        self.uploaded
            .lock()
            .unwrap()
            .push((file.filename.clone(), file.folder, form_id.to_string()));
        Ok(())
    }

    async fn download_archive(&self, filename: &str) -> TransportResult<Vec<u8>> {
        self.fetch(filename)
    }

    async fn download_media(&self, filename: &str) -> TransportResult<Vec<u8>> {
        self.fetch(filename)
    }
}

/// Connectivity fixed at construction.
pub struct FakeConnectivity(pub bool);

#[async_trait]
impl ConnectivityCheck for FakeConnectivity {
    async fn is_connected(&self) -> bool {
        self.0
    }
}
