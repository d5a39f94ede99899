use std::path::Path;

use console::style;

use crate::cli::commands::ValidateArgs;
use crate::cli::error::CliError;
use crate::config::{self, credentials::mask_key, parser::schema_warnings};
use crate::errors::BugtraceError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), CliError> {
    let path = Path::new(&args.config);
    let config = config::parse_config(path).await?;

    let content = tokio::fs::read_to_string(path).await.map_err(BugtraceError::from)?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content).map_err(BugtraceError::from)?;
    let warnings = if yaml.is_null() { Vec::new() } else { schema_warnings(&yaml)? };
    for warning in &warnings {
        println!("  {} {}", style("warning:").yellow(), warning);
    }

    println!("Configuration is valid: {}", args.config);
    println!(
        "  provider {} | model {} | mode {} | depth {}",
        config.provider(),
        config.model(),
        config.mode(),
        config.depth()
    );
    let key = config.api_key().map(|k| mask_key(&k)).unwrap_or_else(|| "not set".to_string());
    println!("  api key {}", key);
    Ok(())
}
