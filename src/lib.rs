pub mod errors;
pub mod models;
pub mod lifecycle;
pub mod llm;
pub mod parsing;
pub mod prompts;
pub mod pipeline;
pub mod reporting;
pub mod config;
pub mod utils;
pub mod cli;
