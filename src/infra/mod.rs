//! Concrete [`RecordSource`](crate::services::RecordSource) implementations.

pub mod open_data;
pub mod upload;

pub use open_data::OpenDataClient;
pub use upload::UploadSource;
