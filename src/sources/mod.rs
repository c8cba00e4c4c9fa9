//! Timing source implementations

pub mod http;
pub mod recorded;

pub use http::HttpSource;
pub use recorded::RecordedSource;
