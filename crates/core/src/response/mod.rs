mod cleaner;
mod compound;
mod iterations;
mod types;
mod values;

pub use cleaner::{clean_value, sanitize_value};
pub use compound::{CompoundId, ITERATION_SEPARATOR};
pub use iterations::{group_repetitions, GroupRepetition, RepeatableGroupIterations};
pub use types::{QuestionResponse, ResponseType};
pub use values::{CascadeValue, OptionValue};
