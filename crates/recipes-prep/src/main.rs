use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{ensure, Context};
use clap::Parser;
use recipe_map_shared::models::{ContentDataset, ContentItem};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a recipe CSV into the map's content dataset")]
struct Args {
    /// Delimited input with a header row: region, recipe name, url
    #[arg(long, default_value = "data/recipes.csv")]
    input: PathBuf,

    /// Where to write the JSON dataset
    #[arg(long, default_value = "crates/frontend/assets/data/recipes.json")]
    output: PathBuf,

    /// Field delimiter (single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

/// Tally of a conversion run.
#[derive(Debug, Default, PartialEq)]
struct Report {
    rows: usize,
    skipped: usize,
}

/// Read delimited rows and group them by region, keeping row order.
///
/// Columns are taken by position; the header row is skipped.
fn convert<R: Read>(reader: R, delimiter: u8) -> (ContentDataset, Report) {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut dataset = ContentDataset::default();
    let mut report = Report::default();

    for (index, result) in rdr.records().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable row");
                report.skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |i: usize| record.get(i).filter(|s| !s.is_empty());
        match (field(0), field(1), field(2)) {
            (Some(region), Some(title), Some(url)) => {
                dataset.push(region, ContentItem::new(title, url));
                report.rows += 1;
            }
            _ => {
                warn!(line, "Skipping row with a missing field");
                report.skipped += 1;
            }
        }
    }

    (dataset, report)
}

fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    ensure!(
        delimiter.is_ascii(),
        "delimiter must be a single ASCII character, got {delimiter:?}"
    );
    Ok(delimiter as u8)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let delimiter = delimiter_byte(args.delimiter)?;

    let file = fs::File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let (dataset, report) = convert(file, delimiter);

    let json = serde_json::to_string_pretty(&dataset).context("failed to serialize dataset")?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&args.output, json + "\n")
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        regions = dataset.region_count(),
        recipes = dataset.item_count(),
        skipped = report.skipped,
        output = %args.output.display(),
        "Wrote content dataset"
    );
    Ok(())
}
