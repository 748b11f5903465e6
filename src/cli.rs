//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Fetch product details for a list of identifiers into xlsx and CSV files.
///
/// Every identifier in the input list is fetched from the product API,
/// normalized, and appended to both output files. Re-running appends after
/// the rows already present.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Identifier list, one per line [default: skus_from_html.txt]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output spreadsheet [default: adidas_products.xlsx]
    #[arg(short, long)]
    pub spreadsheet: Option<PathBuf>,

    /// Output CSV file [default: adidas_products.csv]
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Directory for bodies of non-200 responses [default: .]
    #[arg(short, long)]
    pub diagnostics_dir: Option<PathBuf>,

    /// Do not save bodies of non-200 responses
    #[arg(long, conflicts_with = "diagnostics_dir")]
    pub no_diagnostics: bool,

    /// Product API base URL [default: https://www.adidas.jp]
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Attempts per identifier for 429/403/network failures (1-10) [default: 5]
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_attempts: Option<u8>,

    /// Config file (defaults to $XDG_CONFIG_HOME/product-harvester/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
