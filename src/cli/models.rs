use console::style;

use crate::cli::error::CliError;
use crate::llm::catalog::{DEFAULT_MODEL, OPENROUTER_MODELS};

pub async fn handle_models() -> Result<(), CliError> {
    for model in OPENROUTER_MODELS {
        let marker = if model.recommended { style("(recommended)").green().to_string() } else { String::new() };
        let default = if model.id == DEFAULT_MODEL { style("*").cyan().to_string() } else { " ".to_string() };
        println!("{} {:<40} {} {}", default, model.id, model.label, marker);
    }
    println!();
    println!(
        "bugtrace {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
    );
    Ok(())
}
