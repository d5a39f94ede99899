pub mod types;
pub mod classification;

pub use types::BugtraceError;
pub use classification::ErrorClassification;
