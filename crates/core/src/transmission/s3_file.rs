//! Classification of files uploaded to object storage.

use serde::Serialize;

/// Folder holding exported response archives.
pub const DATA_FOLDER: &str = "devicezip";
/// Folder holding media files.
pub const MEDIA_FOLDER: &str = "images";
/// Folder holding form definition archives, download only.
pub const FORMS_FOLDER: &str = "surveys";

pub const CONTENT_TYPE_ZIP: &str = "application/zip";
pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_MP4: &str = "video/mp4";
pub const CONTENT_TYPE_OCTET: &str = "application/octet-stream";

/// Notification action sent once a file is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyAction {
    Submit,
    Image,
}

impl NotifyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyAction::Submit => "submit",
            NotifyAction::Image => "image",
        }
    }
}

/// Where and how a file is stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3File {
    pub filename: String,
    pub folder: &'static str,
    pub content_type: &'static str,
    /// Media is world-readable; response archives are private.
    pub public: bool,
    pub action: NotifyAction,
}

impl S3File {
    /// Classifies a file by extension. Empty names yield `None`.
    ///
    /// ```
    /// use flowsync_core::transmission::{S3File, MEDIA_FOLDER};
    ///
    /// let file = S3File::classify("photo.JPG").unwrap();
    /// assert_eq!(file.folder, MEDIA_FOLDER);
    /// assert!(file.public);
    /// assert!(S3File::classify("").is_none());
    /// ```
    pub fn classify(filename: &str) -> Option<Self> {
        if filename.trim().is_empty() {
            return None;
        }
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let media = |content_type: &'static str| Self {
            filename: filename.to_string(),
            folder: MEDIA_FOLDER,
            content_type,
            public: true,
            action: NotifyAction::Image,
        };
        let data = |content_type: &'static str| Self {
            filename: filename.to_string(),
            folder: DATA_FOLDER,
            content_type,
            public: false,
            action: NotifyAction::Submit,
        };

        Some(match extension.as_str() {
            "zip" => data(CONTENT_TYPE_ZIP),
            "jpg" | "jpeg" => media(CONTENT_TYPE_JPEG),
            "png" => media(CONTENT_TYPE_PNG),
            "mp4" => media(CONTENT_TYPE_MP4),
            _ => data(CONTENT_TYPE_OCTET),
        })
    }

    /// Object key inside the bucket, `<folder>/<filename>`.
    pub fn object_key(&self) -> String {
        format!("{}/{}", self.folder, self.filename)
    }

    /// Path on the storage proxy, `/<instance>/<folder>/<form_id>/<filename>`.
    pub fn proxy_path(&self, instance: &str, form_id: &str) -> String {
        format!("/{}/{}/{}/{}", instance, self.folder, form_id, self.filename)
    }
}

/// Proxy path for a previously uploaded file, `/<instance>/<folder>/<filename>`.
pub fn download_path(instance: &str, folder: &str, filename: &str) -> String {
    format!("/{instance}/{folder}/{filename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_is_private_data() {
        let file = S3File::classify("data.zip").unwrap();
        assert!(!file.public);
        assert_eq!(file.folder, DATA_FOLDER);
        assert_eq!(file.action, NotifyAction::Submit);
        assert_eq!(file.content_type, CONTENT_TYPE_ZIP);
    }

    #[test]
    fn test_images_and_video_are_public_media() {
        for (name, content_type) in [
            ("data.jpg", CONTENT_TYPE_JPEG),
            ("data.png", CONTENT_TYPE_PNG),
            ("clip.mp4", CONTENT_TYPE_MP4),
        ] {
            let file = S3File::classify(name).unwrap();
            assert!(file.public);
            assert_eq!(file.folder, MEDIA_FOLDER);
            assert_eq!(file.action, NotifyAction::Image);
            assert_eq!(file.content_type, content_type);
        }
    }

    #[test]
    fn test_unknown_extension_is_private_octet_stream() {
        let file = S3File::classify("notes").unwrap();
        assert!(!file.public);
        assert_eq!(file.content_type, CONTENT_TYPE_OCTET);
    }

    #[test]
    fn test_blank_name_is_not_classified() {
        assert!(S3File::classify("  ").is_none());
    }

    #[test]
    fn test_paths() {
        let file = S3File::classify("abc.zip").unwrap();
        assert_eq!(file.object_key(), "devicezip/abc.zip");
        assert_eq!(file.proxy_path("akvoflow-1", "1001"), "/akvoflow-1/devicezip/1001/abc.zip");
        assert_eq!(download_path("akvoflow-1", FORMS_FOLDER, "1001.zip"), "/akvoflow-1/surveys/1001.zip");
    }
}
