pub mod record_source;

pub use record_source::{DataOrigin, Dataset, RecordSource, load_dataset};
