use colored::Colorize;

use crate::ocr::TesseractOcr;
use crate::settings::{load_settings, settings_file_exists};

fn found(ok: bool) -> String {
    if ok {
        "found".green().to_string()
    } else {
        "missing".red().to_string()
    }
}

pub fn run() {
    let settings = load_settings();
    let ocr = TesseractOcr::from_settings(&settings);

    println!(
        "Settings:        {}",
        if settings_file_exists() { "saved" } else { "(defaults, run `genesis init`)" }
    );
    println!("Output dir:      {}", settings.output_directory);
    println!(
        "Reference table: {}",
        if settings.reference_table_path.is_empty() {
            "(not set)"
        } else {
            settings.reference_table_path.as_str()
        }
    );
    println!("Code source:     {:?}", settings.code_source);
    println!("Log file:        {}", settings.log_file);
    println!();
    println!(
        "Rasterizer:      {} ({})",
        settings.raster_tool_path,
        found(ocr.raster_tool_available())
    );
    println!(
        "OCR engine:      {} ({}, lang {}, psm {}, {} dpi)",
        settings.ocr_binary_path,
        found(ocr.ocr_binary_available()),
        settings.ocr_language,
        settings.page_segmentation_mode,
        settings.dpi
    );
}
