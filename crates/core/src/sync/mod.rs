mod error;
mod result;
mod traits;
mod types;

pub use error::{SyncError, TransportError, TransportResult};
pub use result::{DownloadResult, ResultCode};
pub use traits::{ConnectivityCheck, FlowApi, ObjectStore};
pub use types::{
    image_file_name, ApiDataPoint, ApiFormInstance, ApiQuestionAnswer, DataPoint, DataPointPage,
    PendingFiles,
};
