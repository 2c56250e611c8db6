//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tenor: bond returns against key-rate risk factors
#[derive(Debug, Parser)]
#[command(name = "tenor")]
#[command(about = "Tenor: bond returns against key-rate risk factors", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Directory holding the input workbooks
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Assets to select, comma separated (default: first five)
    #[arg(long, global = true, value_delimiter = ',')]
    pub(crate) assets: Vec<String>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub(crate) start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub(crate) end: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub(crate) format: OutputFormat,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Headline figures for the selection
    Overview,

    /// Rate changes, returns, durations, convexity and loadings
    Explore,

    /// Return statistics, correlations and risk metrics
    Analytics,

    /// Data behind the dashboard charts
    Charts,

    /// Write the filtered returns to a file
    Export {
        /// Destination file (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// List available assets and the date range
    Assets,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned plain-text tables
    #[default]
    Text,
    /// Markdown tables
    Markdown,
    /// JSON report
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_global_selection() {
        let cli = Cli::try_parse_from([
            "tenor",
            "analytics",
            "--assets",
            "BOND_A,BOND_B",
            "--start",
            "2024-01-03",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Analytics));
        assert_eq!(cli.assets, vec!["BOND_A", "BOND_B"]);
        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(cli.end, None);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[rstest]
    #[case(&["tenor", "export"], None, false)]
    #[case(&["tenor", "export", "--json", "--output", "out.json"], Some("out.json"), true)]
    fn test_parses_export(
        #[case] args: &[&str],
        #[case] expected_output: Option<&str>,
        #[case] expected_json: bool,
    ) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Export { output, json } => {
                assert_eq!(output, expected_output.map(PathBuf::from));
                assert_eq!(json, expected_json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["tenor", "overview", "--start", "03/01/2024"]).is_err());
    }
}
