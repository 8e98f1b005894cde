use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GenesisError, Result};

/// How descriptions are cleaned after the leading sequence number is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionCleanup {
    /// Strip only the leading run of digits and whitespace.
    #[default]
    LeadingDigits,
    /// Additionally drop every character that is not a letter or whitespace.
    AlphaOnly,
}

/// What an amount that fails conversion turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFallback {
    /// Leave the amount empty and log a warning.
    #[default]
    Null,
    /// Keep the recognized text verbatim in the outputs.
    PassThrough,
}

/// Where accounting codes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    #[default]
    ReferenceTable,
    Embedded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_ocr_binary")]
    pub ocr_binary_path: String,
    #[serde(default = "default_raster_tool")]
    pub raster_tool_path: String,
    #[serde(default)]
    pub reference_table_path: String,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u8,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_true")]
    pub grayscale: bool,
    #[serde(default)]
    pub description_cleanup: DescriptionCleanup,
    #[serde(default)]
    pub amount_fallback: AmountFallback,
    #[serde(default)]
    pub code_source: CodeSource,
    #[serde(default = "default_balance_marker")]
    pub balance_marker: String,
    #[serde(default = "default_batch_number")]
    pub batch_number: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_ocr_binary() -> String {
    "tesseract".to_string()
}

fn default_raster_tool() -> String {
    "pdftoppm".to_string()
}

fn default_output_directory() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("genesis")
        .to_string_lossy()
        .to_string()
}

fn default_ocr_language() -> String {
    "por".to_string()
}

fn default_page_segmentation_mode() -> u8 {
    6
}

fn default_dpi() -> u32 {
    300
}

fn default_true() -> bool {
    true
}

fn default_balance_marker() -> String {
    "SALDO".to_string()
}

fn default_batch_number() -> String {
    "1".to_string()
}

fn default_log_file() -> String {
    config_dir().join("processing.log").to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ocr_binary_path: default_ocr_binary(),
            raster_tool_path: default_raster_tool(),
            reference_table_path: String::new(),
            output_directory: default_output_directory(),
            ocr_language: default_ocr_language(),
            page_segmentation_mode: default_page_segmentation_mode(),
            dpi: default_dpi(),
            grayscale: true,
            description_cleanup: DescriptionCleanup::default(),
            amount_fallback: AmountFallback::default(),
            code_source: CodeSource::default(),
            balance_marker: default_balance_marker(),
            batch_number: default_batch_number(),
            log_file: default_log_file(),
        }
    }
}

impl Settings {
    /// Configured reference table, if any.
    pub fn reference_table(&self) -> Option<PathBuf> {
        if self.reference_table_path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.reference_table_path))
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("genesis")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| GenesisError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
