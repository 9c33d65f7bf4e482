mod s3_file;
mod types;

pub use s3_file::{
    download_path, NotifyAction, S3File, CONTENT_TYPE_JPEG, CONTENT_TYPE_MP4, CONTENT_TYPE_OCTET,
    CONTENT_TYPE_PNG, CONTENT_TYPE_ZIP, DATA_FOLDER, FORMS_FOLDER, MEDIA_FOLDER,
};
pub use types::{Transmission, TransmissionStatus};
