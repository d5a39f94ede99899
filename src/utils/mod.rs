pub mod formatting;
pub mod truncation;

pub use formatting::{format_duration, pluralize};
pub use truncation::{display_target, truncate_chars};
