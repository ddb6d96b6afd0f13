//! Draws an availability export as a family x location heatmap.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueHint};
use offerings::heatmap::{generate_heatmap, HeatmapOptions};
use offerings::logging::init_logging;
use offerings::{LogReporter, Reporter};

/// Plot which instance type families are offered in which locations.
///
/// Each row of the heatmap is an instance family (`m5` for `m5.large`), each
/// column a location. Cells hold the number of the family's types offered
/// there, divided by the row's maximum. Pairs absent from the input are
/// drawn hatched.
#[derive(Parser, Debug)]
#[command(name = "heatmap", version, about, long_about)]
struct Args {
    /// Tab separated input with `InstanceType`, `Location` and
    /// `ExistsInLocation` columns.
    #[arg(short = 'i', long, value_hint = ValueHint::FilePath)]
    input_file: PathBuf,

    /// Where to write the image. It is always PNG.
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
    output_file: PathBuf,

    /// Also write the summed table, before normalization, as CSV.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pivot_csv: Option<PathBuf>,

    /// Also write the normalized table as CSV.
    #[arg(long, value_hint = ValueHint::FilePath)]
    normalized_csv: Option<PathBuf>,
}

impl From<Args> for HeatmapOptions {
    fn from(args: Args) -> Self {
        HeatmapOptions {
            input_file: args.input_file,
            output_file: args.output_file,
            pivot_csv: args.pivot_csv,
            normalized_csv: args.normalized_csv,
        }
    }
}

fn run(args: Args, reporter: &dyn Reporter) -> anyhow::Result<()> {
    let options = HeatmapOptions::from(args);
    generate_heatmap(&options, reporter).with_context(|| {
        format!(
            "Failed to create heatmap from {}",
            options.input_file.display()
        )
    })?;
    Ok(())
}

fn main() {
    let args = Args::try_parse().unwrap_or_else(|e| {
        if !e.use_stderr() {
            // --help and --version
            e.exit();
        }
        e.print().unwrap_or_else(|_| eprintln!("{e}"));
        std::process::exit(1);
    });

    init_logging("heatmap", "info");
    let reporter = LogReporter;

    if let Err(e) = run(args, &reporter) {
        reporter.error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
