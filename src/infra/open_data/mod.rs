//! Live NYC Open Data source.

mod client;

pub use client::OpenDataClient;
