mod error;
mod traits;

pub use error::{RepositoryError, Result};
pub use traits::{
    CursorRepository, DataPointRepository, FormInstanceRepository, FormRepository,
    ResponseRepository, TransmissionRepository,
};
