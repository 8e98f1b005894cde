use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{GenesisError, Result};
use crate::settings::Settings;

/// Turns a scanned PDF into recognized text, one string per page.
pub trait TextRecognizer {
    fn recognize_pdf(&self, pdf: &Path) -> Result<Vec<String>>;
}

/// Rasterizes with `pdftoppm` and recognizes each page with `tesseract`.
pub struct TesseractOcr {
    ocr_binary: String,
    raster_tool: String,
    language: String,
    page_segmentation_mode: u8,
    dpi: u32,
    grayscale: bool,
}

impl TesseractOcr {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ocr_binary: settings.ocr_binary_path.clone(),
            raster_tool: settings.raster_tool_path.clone(),
            language: settings.ocr_language.clone(),
            page_segmentation_mode: settings.page_segmentation_mode,
            dpi: settings.dpi,
            grayscale: settings.grayscale,
        }
    }

    pub fn raster_tool_available(&self) -> bool {
        Command::new(&self.raster_tool).arg("-v").output().is_ok()
    }

    pub fn ocr_binary_available(&self) -> bool {
        Command::new(&self.ocr_binary).arg("--version").output().is_ok()
    }

    pub fn is_available(&self) -> bool {
        let raster = self.raster_tool_available();
        let ocr = self.ocr_binary_available();
        if !raster {
            debug!("{} not found - install poppler-utils", self.raster_tool);
        }
        if !ocr {
            debug!("{} not found - install tesseract-ocr", self.ocr_binary);
        }
        raster && ocr
    }

    /// Render every page of `pdf` as a PNG inside `dir`, in page order.
    pub fn rasterize(&self, pdf: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut cmd = Command::new(&self.raster_tool);
        cmd.arg("-png").arg("-r").arg(self.dpi.to_string());
        if self.grayscale {
            cmd.arg("-gray");
        }
        cmd.arg(pdf).arg(dir.join("page"));

        let output = cmd
            .output()
            .map_err(|e| GenesisError::Ocr(format!("failed to run {}: {e}", self.raster_tool)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenesisError::Ocr(format!(
                "{} failed on {}: {}",
                self.raster_tool,
                pdf.display(),
                stderr.trim()
            )));
        }

        let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pages.sort_by_key(|p| page_number(p));

        if pages.is_empty() {
            return Err(GenesisError::Ocr(format!(
                "{} produced no pages for {}",
                self.raster_tool,
                pdf.display()
            )));
        }
        Ok(pages)
    }

    /// Recognize the text of one page image.
    pub fn recognize(&self, image: &Path) -> Result<String> {
        let output = Command::new(&self.ocr_binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| GenesisError::Ocr(format!("failed to run {}: {e}", self.ocr_binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenesisError::Ocr(format!(
                "{} failed on {}: {}",
                self.ocr_binary,
                image.display(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl TextRecognizer for TesseractOcr {
    fn recognize_pdf(&self, pdf: &Path) -> Result<Vec<String>> {
        let scratch = tempfile::tempdir()?;
        let images = self.rasterize(pdf, scratch.path())?;
        info!("Rendered {} page(s) from {}", images.len(), pdf.display());

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let text = self.recognize(image)?;
            if text.trim().is_empty() {
                warn!("Page {} of {} produced no text", i + 1, pdf.display());
            }
            pages.push(text);
        }
        Ok(pages)
    }
}

/// `page-7.png` -> 7
fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}
