//! CLI argument definitions for ferroscreen.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `screen` | Filter the batch and list the largest matches |
//! | `summary` | Sector, country and scalar rollups for the matches |
//! | `export` | Write the matches to CSV or JSON |
//! | `generate` | Write a synthetic raw batch to disk |
//! | `watch` | Re-run `summary` on an interval through a batch cache |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--source` | `nasdaq` | Where raw rows come from (nasdaq, file, synthetic) |
//! | `--input` | | JSON file read by `--source file` |
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--timeout-ms` | `10000` | Source request timeout in ms |
//! | `--min-records` | `100` | Batch size guaranteed by fallback generation |
//! | `--seed` | | Seed for reproducible synthetic records |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! ferroscreen screen --sector Technology --min-market-cap-millions 500 --pretty
//! ferroscreen summary --source file --input raw_data.json --format table
//! ferroscreen export --country Canada --export-format json --output canada.json
//! ferroscreen generate --count 50 --seed 7
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferroscreen_core::{
    market_cap_from_millions, ExportFormat, FilterCriteria, PriceRange, Selection, ValidationError,
};

/// Stock screener over NASDAQ rows with synthetic fallback.
#[derive(Debug, Parser)]
#[command(
    name = "ferroscreen",
    author,
    version,
    about = "Stock screening CLI with synthetic fallback data",
    long_about = "ferroscreen loads a batch of stock rows, normalizes them, filters them and \
summarizes the result. When the upstream source is unavailable or returns too few rows, \
synthetic records fill the batch up to the configured minimum.\n\
\n\
Use 'ferroscreen <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Where raw rows come from.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Nasdaq)]
    pub source: SourceSelector,

    /// JSON array of raw rows, used with `--source file`.
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Source request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Minimum batch size; overrides FERROSCREEN_MIN_RECORDS.
    #[arg(long, global = true)]
    pub min_records: Option<usize>,

    /// Seed for synthetic records; overrides FERROSCREEN_SEED.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Log at debug level to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON.
    Ndjson,
}

/// Raw row source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// NASDAQ public screener API.
    Nasdaq,
    /// Local JSON file given by `--input`.
    File,
    /// Synthetic records only.
    Synthetic,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter the batch and list the largest matches by market cap.
    ///
    /// # Examples
    ///
    ///   ferroscreen screen --sector Energy --limit 10
    ///   ferroscreen screen --min-price 20 --max-price 80 --format table
    Screen(ScreenArgs),

    /// Sector, country and scalar rollups for the filtered batch.
    Summary(SummaryArgs),

    /// Write the filtered batch to CSV or JSON.
    Export(ExportArgs),

    /// Write a synthetic raw batch to disk.
    Generate(GenerateArgs),

    /// Re-run the summary on an interval, reusing a cached batch.
    Watch(WatchArgs),
}

/// Filter flags shared by every command that reads a batch.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Exact sector match; "All" disables the filter.
    #[arg(long)]
    pub sector: Option<String>,

    /// Exact country match; "All" disables the filter.
    #[arg(long)]
    pub country: Option<String>,

    /// Market cap floor in millions.
    #[arg(long, default_value_t = 0.0)]
    pub min_market_cap_millions: f64,

    /// Inclusive lower price bound.
    #[arg(long, default_value_t = 0.0)]
    pub min_price: f64,

    /// Inclusive upper price bound.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Volume floor.
    #[arg(long, default_value_t = 0)]
    pub min_volume: u64,
}

impl FilterArgs {
    pub fn to_criteria(&self) -> Result<FilterCriteria, ValidationError> {
        let price_range = PriceRange::new(self.min_price, self.max_price.unwrap_or(f64::INFINITY))?;

        Ok(FilterCriteria::new()
            .with_sector(Selection::from(self.sector.as_deref()))
            .with_country(Selection::from(self.country.as_deref()))
            .with_min_market_cap(market_cap_from_millions(self.min_market_cap_millions))?
            .with_price_range(price_range)
            .with_min_volume(self.min_volume))
    }
}

/// Arguments for the `screen` command.
#[derive(Debug, Args)]
pub struct ScreenArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Number of matches to list.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for the `summary` command.
#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Number of countries listed in the ranking.
    #[arg(long, default_value_t = 10)]
    pub top_countries: usize,
}

/// Arguments for the `export` command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Export file format (csv or json).
    #[arg(long, default_value = "csv")]
    pub export_format: ExportFormat,

    /// Output path; defaults to `stocks_YYYYMMDD_HHMMSS.<ext>`.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Export only the largest N matches by market cap.
    #[arg(long)]
    pub top: Option<usize>,
}

/// Arguments for the `generate` command.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of synthetic records.
    #[arg(long, default_value_t = 100)]
    pub count: usize,

    /// Directory receiving `raw_data.csv` and `raw_data.json`.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File formats to write.
    #[arg(long, value_delimiter = ',', default_values = ["csv", "json"])]
    pub formats: Vec<ExportFormat>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Seconds between rounds.
    #[arg(long, default_value_t = 5)]
    pub interval_secs: u64,

    /// Number of rounds.
    #[arg(long, default_value_t = 3)]
    pub iterations: usize,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "ferroscreen",
            "screen",
            "--sector",
            "Technology",
            "--source",
            "synthetic",
            "--seed",
            "9",
            "--pretty",
        ]);

        assert_eq!(cli.source, SourceSelector::Synthetic);
        assert_eq!(cli.seed, Some(9));
        assert!(cli.pretty);
        let Command::Screen(args) = cli.command else {
            panic!("expected screen command");
        };
        assert_eq!(args.limit, 20);
        assert_eq!(args.filters.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn filter_flags_build_criteria_in_currency_units() {
        let cli = Cli::parse_from([
            "ferroscreen",
            "summary",
            "--min-market-cap-millions",
            "500",
            "--max-price",
            "80",
            "--country",
            "All",
        ]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary command");
        };

        let criteria = args.filters.to_criteria().expect("valid criteria");
        assert_eq!(criteria.min_market_cap(), 500_000_000.0);
        assert_eq!(criteria.price_range().upper(), 80.0);
        assert_eq!(criteria.country(), &Selection::All);
    }

    #[test]
    fn sector_labels_follow_core_selection_rules() {
        for label in ["all", "ALL", "  All ", ""] {
            let filters = FilterArgs {
                sector: Some(String::from(label)),
                country: None,
                min_market_cap_millions: 0.0,
                min_price: 0.0,
                max_price: None,
                min_volume: 0,
            };
            let criteria = filters.to_criteria().expect("valid criteria");
            assert_eq!(criteria.sector(), &Selection::from_label(label));
            assert_eq!(criteria.sector(), &Selection::All);
        }
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filters = FilterArgs {
            sector: None,
            country: None,
            min_market_cap_millions: 0.0,
            min_price: 100.0,
            max_price: Some(10.0),
            min_volume: 0,
        };

        assert!(matches!(
            filters.to_criteria(),
            Err(ValidationError::InvalidPriceRange { .. })
        ));
    }

    #[test]
    fn export_format_parses_through_core() {
        let cli = Cli::parse_from(["ferroscreen", "export", "--export-format", "json"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.export_format, ExportFormat::Json);
    }

    #[test]
    fn generate_defaults_to_both_formats() {
        let cli = Cli::parse_from(["ferroscreen", "generate"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.formats, [ExportFormat::Csv, ExportFormat::Json]);
        assert_eq!(args.count, 100);
    }
}
