mod error;
mod header;
mod metadata;
mod survey;
mod types;

pub use error::ParseError;
pub use header::FormHeader;
pub use metadata::{
    build_form_instance_metadata, zip_file_name, ExportContext, ExportedResponse,
    FormInstanceData, FormInstanceMetadata, DATA_FILE_NAME,
};
pub use survey::{InstalledForm, SurveyMetadata};
pub use types::{FormInstance, FormInstanceStatus};
