use std::path::PathBuf;

use crate::cli::{print_unmatched, RunOptions};
use crate::error::Result;
use crate::ocr::TesseractOcr;
use crate::pipeline::{process, FileOutcome};
use crate::settings::load_settings;

pub fn run(files: &[String], options: &RunOptions) -> Result<()> {
    let mut settings = load_settings();
    options.apply(&mut settings);

    let ocr = TesseractOcr::from_settings(&settings);
    if !ocr.is_available() {
        println!(
            "Warning: {} or {} not found; run `genesis status` for details.",
            settings.raster_tool_path, settings.ocr_binary_path
        );
    }

    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
    let output_dir = PathBuf::from(&settings.output_directory);
    println!("Processing {} file(s)...", paths.len());

    let summary = process(&paths, &output_dir, &settings, &ocr, |index, total, outcome| {
        match outcome {
            FileOutcome::Processed { report, .. } => {
                println!(
                    "File {index}/{total} processed and saved: {} record(s), {} classified, {} line(s) ignored",
                    report.records, report.classified, report.unparsed
                );
                println!("  {}", report.spreadsheet.display());
                println!("  {}", report.text.display());
            }
            FileOutcome::Empty { .. } => println!(
                "File {index}/{total}: no transactions found in {}",
                outcome.path().display()
            ),
            FileOutcome::Failed { error, .. } => println!(
                "File {index}/{total}: error processing {}: {error}",
                outcome.path().display()
            ),
        }
    })?;

    print_unmatched(&summary.unmatched);
    println!(
        "\n{} processed, {} failed. Files saved to {}",
        summary.processed(),
        summary.failed(),
        output_dir.display()
    );
    Ok(())
}
