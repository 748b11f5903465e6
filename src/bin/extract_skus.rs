use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::sku::{append_skus, load_existing_skus, scan_html};

/// Extract product identifiers from saved listing pages into the identifier list.
#[derive(Parser, Debug)]
#[command(name = "extract-skus")]
#[command(
    author,
    version,
    about = "Extract product identifiers from saved HTML pages into an identifier list"
)]
struct Args {
    /// Saved HTML pages to scan
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Identifier list to deduplicate against and append to
    #[arg(short, long, default_value = "skus_from_html.txt")]
    list: PathBuf,

    /// Print new identifiers without appending them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut known: HashSet<String> = load_existing_skus(&args.list)
        .with_context(|| format!("Failed to load existing SKUs from {}", args.list.display()))?;
    eprintln!(
        "Loaded {} existing SKU(s) from {}",
        known.len(),
        args.list.display()
    );

    let mut new_skus = Vec::new();
    for input in &args.inputs {
        let html = fs::read(input)
            .with_context(|| format!("Failed to read HTML file: {}", input.display()))?;
        let html = String::from_utf8_lossy(&html);

        let scan = scan_html(&html, &known);
        eprintln!(
            "{}: {} href match(es), {} text match(es), {} new SKU(s)",
            input.display(),
            scan.link_matches,
            scan.text_matches,
            scan.skus.len()
        );

        known.extend(scan.skus.iter().cloned());
        new_skus.extend(scan.skus);
    }

    if args.dry_run {
        for sku in &new_skus {
            println!("{sku}");
        }
        eprintln!("Dry run: {} new SKU(s) not written", new_skus.len());
        return Ok(());
    }

    append_skus(&args.list, &new_skus)
        .with_context(|| format!("Failed to append SKUs to {}", args.list.display()))?;
    eprintln!(
        "Appended {} new SKU(s) to {}",
        new_skus.len(),
        args.list.display()
    );

    Ok(())
}
