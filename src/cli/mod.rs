pub mod commands;
pub mod error;
pub mod progress;
pub mod analyze;
pub mod validate;
pub mod models;

pub use commands::{Cli, Commands};
pub use error::CliError;
