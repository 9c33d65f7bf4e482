use std::path::PathBuf;
use std::sync::Arc;

use flowsync_core::storage::{CursorRepository, DataPointRepository};
use flowsync_core::sync::{ApiDataPoint, DataPoint, DataPointPage, FlowApi, ObjectStore, SyncError};

/// Storage needed by the data point download.
pub trait DataPointStore: DataPointRepository + CursorRepository {}

impl<T: DataPointRepository + CursorRepository> DataPointStore for T {}

/// Pages through the data points of a survey and stores them locally.
pub struct DataPointDataRepository {
    api: Arc<dyn FlowApi>,
    store: Arc<dyn DataPointStore>,
    objects: Arc<dyn ObjectStore>,
    media_dir: PathBuf,
}

impl DataPointDataRepository {
    pub fn new(
        api: Arc<dyn FlowApi>,
        store: Arc<dyn DataPointStore>,
        objects: Arc<dyn ObjectStore>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api,
            store,
            objects,
            media_dir: media_dir.into(),
        }
    }

    /// Downloads every page newer than the stored cursor.
    ///
    /// The cursor is saved after each page, so an interrupted download resumes where
    /// it stopped. Returns the number of data points stored.
    pub async fn download_data_points(&self, survey_id: i64) -> Result<usize, SyncError> {
        let mut cursor = self.store.get_cursor(survey_id).await?;
        let mut total = 0;

        loop {
            let page = self
                .api
                .download_data_points(survey_id, cursor.as_deref())
                .await?;
            if page.data_points.is_empty() {
                break;
            }

            total += self.save_page(&page).await?;

            let Some(next) = page.cursor else {
                break;
            };
            if cursor.as_deref() == Some(next.as_str()) {
                break;
            }
            self.store.save_cursor(survey_id, &next).await?;
            tracing::debug!(survey_id, cursor = %next, "Stored data point cursor");
            cursor = Some(next);
        }

        tracing::info!(survey_id, count = total, "Downloaded data points");
        Ok(total)
    }

    async fn save_page(&self, page: &DataPointPage) -> Result<usize, SyncError> {
        for api_point in &page.data_points {
            self.save_data_point(api_point).await?;
        }
        Ok(page.data_points.len())
    }

    async fn save_data_point(&self, api_point: &ApiDataPoint) -> Result<(), SyncError> {
        let data_point = DataPoint::from(api_point);
        self.store.save_data_point(&data_point).await?;

        for api_instance in &api_point.survey_instances {
            let instance = api_instance.to_form_instance(&data_point.id);
            let stored = self
                .store
                .save_downloaded_instance(&instance, &api_instance.to_responses())
                .await?;
            if !stored {
                tracing::debug!(uuid = %instance.uuid, "Kept local form instance");
            }
            for filename in api_instance.image_file_names() {
                self.fetch_image(&filename).await;
            }
        }
        Ok(())
    }

    /// Downloads an image unless it is already on disk. Failures are retried next sync.
    async fn fetch_image(&self, filename: &str) {
        let path = self.media_dir.join(filename);
        if path.exists() {
            return;
        }
        let bytes = match self.objects.download_image(filename).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(filename, error = %e, "Skipping image download");
                return;
            }
        };
        let written = match tokio::fs::create_dir_all(&self.media_dir).await {
            Ok(()) => tokio::fs::write(&path, bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::warn!(filename, error = %e, "Failed to store image");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use flowsync_core::form::FormInstanceStatus;
    use flowsync_core::storage::{FormInstanceRepository, ResponseRepository};
    use flowsync_core::sync::TransportError;
    use uuid::Uuid;

    use super::*;
    use crate::storage::SqliteStore;
    use crate::testing::{FakeApi, FakeObjectStore};

    const UUID: &str = "2f1c2e5e-6a35-4d4c-a0c2-9d8e3cb0f001";

    fn page(id: &str, cursor: Option<&str>) -> DataPointPage {
        let uuid = if id == "dp-1" {
            UUID.to_string()
        } else {
            Uuid::new_v4().to_string()
        };
        let json = serde_json::json!({
            "dataPointData": [{
                "id": id,
                "surveyGroupId": 77,
                "displayName": format!("Point {id}"),
                "lastModified": 1714564800000i64,
                "surveyInstances": [{
                    "uuid": uuid,
                    "surveyId": 1001,
                    "collectionDate": 1714564800000i64,
                    "formVersion": 1.0,
                    "qasList": [
                        {"q": 11, "a": "5", "t": "VALUE"},
                        {"q": 12, "a": format!("/sdcard/{id}.jpg"), "t": "IMAGE"}
                    ]
                }]
            }],
            "cursor": cursor
        });
        serde_json::from_value(json).unwrap()
    }

    struct Fixture {
        api: Arc<FakeApi>,
        store: Arc<SqliteStore>,
        objects: Arc<FakeObjectStore>,
        media: tempfile::TempDir,
    }

    impl Fixture {
        async fn new(pages: Vec<Result<DataPointPage, TransportError>>) -> Self {
            Self {
                api: Arc::new(FakeApi::with_pages(pages)),
                store: Arc::new(SqliteStore::new_in_memory().await.unwrap()),
                objects: Arc::new(FakeObjectStore::with_remote(&[("dp-1.jpg", b"jpeg")])),
                media: tempfile::tempdir().unwrap(),
            }
        }

        fn repository(&self) -> DataPointDataRepository {
            DataPointDataRepository::new(
                self.api.clone(),
                self.store.clone(),
                self.objects.clone(),
                self.media.path(),
            )
        }
    }

    #[tokio::test]
    async fn test_pages_until_empty_and_stores_cursor() {
        let fixture = Fixture::new(vec![
            Ok(page("dp-1", Some("c-1"))),
            Ok(page("dp-2", Some("c-2"))),
        ])
        .await;

        let count = fixture.repository().download_data_points(5).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(fixture.store.get_cursor(5).await.unwrap().as_deref(), Some("c-2"));
        let requests = fixture.api.page_requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            vec![
                (5, None),
                (5, Some("c-1".to_string())),
                (5, Some("c-2".to_string())),
            ]
        );

        let point = fixture.store.get_data_point("dp-2").await.unwrap().unwrap();
        assert_eq!(point.name, "Point dp-2");

        let instance = fixture
            .store
            .get_form_instance_by_uuid(Uuid::parse_str(UUID).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(instance.status, FormInstanceStatus::Downloaded);
        let responses = fixture.store.get_responses(instance.id.unwrap()).await.unwrap();
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn test_resumes_from_stored_cursor() {
        let fixture = Fixture::new(vec![]).await;
        fixture.store.save_cursor(5, "c-9").await.unwrap();

        let count = fixture.repository().download_data_points(5).await.unwrap();

        assert_eq!(count, 0);
        let requests = fixture.api.page_requests.lock().unwrap().clone();
        assert_eq!(requests, vec![(5, Some("c-9".to_string()))]);
    }

    #[tokio::test]
    async fn test_unchanged_cursor_stops_the_loop() {
        let fixture = Fixture::new(vec![
            Ok(page("dp-1", Some("c-1"))),
            Ok(page("dp-2", Some("c-1"))),
            Ok(page("dp-3", Some("c-3"))),
        ])
        .await;

        let count = fixture.repository().download_data_points(5).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(fixture.api.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_images_are_downloaded_and_failures_skipped() {
        let fixture = Fixture::new(vec![
            Ok(page("dp-1", Some("c-1"))),
            Ok(page("dp-2", None)),
        ])
        .await;

        let count = fixture.repository().download_data_points(5).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read(fixture.media.path().join("dp-1.jpg")).unwrap(), b"jpeg");
        assert!(!fixture.media.path().join("dp-2.jpg").exists());
    }

    #[tokio::test]
    async fn test_existing_images_are_not_downloaded_again() {
        let fixture = Fixture::new(vec![Ok(page("dp-1", None))]).await;
        std::fs::write(fixture.media.path().join("dp-1.jpg"), b"local").unwrap();

        fixture.repository().download_data_points(5).await.unwrap();

        assert_eq!(fixture.objects.downloads.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(fixture.media.path().join("dp-1.jpg")).unwrap(), b"local");
    }

    #[tokio::test]
    async fn test_transport_error_keeps_last_cursor() {
        let fixture = Fixture::new(vec![
            Ok(page("dp-1", Some("c-1"))),
            Err(TransportError::Network("reset".to_string())),
        ])
        .await;

        let err = fixture.repository().download_data_points(5).await.unwrap_err();

        assert!(matches!(err, SyncError::Transport(TransportError::Network(_))));
        assert_eq!(fixture.store.get_cursor(5).await.unwrap().as_deref(), Some("c-1"));
    }
}
