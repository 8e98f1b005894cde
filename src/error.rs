use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenesisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Reference table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Reference table not found: {0}")]
    ReferenceTableNotFound(String),

    #[error("No reference table configured (set one with --reference-table or use --embedded-codes)")]
    MissingReferenceTable,

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GenesisError>;
