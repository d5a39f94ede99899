use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "bugtrace", version, about = "Multi-pass AI security analysis of URLs and source code")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print the final summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log format: text, json
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a URL or a source file
    Analyze(AnalyzeArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// List known OpenRouter models
    Models,
}

#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// Target URL, or a source file path (or inline code) with --mode code
    #[arg(short, long)]
    pub target: String,

    /// Scan mode: recon, active, greybox, code
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Number of independent analysis runs
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Skip the false-positive validation pass
    #[arg(long)]
    pub no_validate: bool,

    /// Enrich every remaining finding with a deep-analysis pass
    #[arg(long)]
    pub deep: bool,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// API key (or set OPENROUTER_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the report is written to
    #[arg(short, long)]
    pub output: Option<String>,

    /// Report format: markdown, json
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Path to the YAML configuration file
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_args() {
        let cli = Cli::parse_from([
            "bugtrace", "-vv", "analyze", "--target", "https://example.com",
            "--mode", "recon", "--depth", "2", "--no-validate", "--deep",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.target, "https://example.com");
                assert_eq!(args.mode.as_deref(), Some("recon"));
                assert_eq!(args.depth, Some(2));
                assert!(args.no_validate);
                assert!(args.deep);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bugtrace", "models", "--no-color", "--log-format", "json"]);
        assert!(cli.no_color);
        assert_eq!(cli.log_format, "json");
        assert!(matches!(cli.command, Commands::Models));
    }
}
