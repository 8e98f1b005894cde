use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::models::TransactionRecord;
use crate::normalizer::format_amount;
use crate::settings::AmountFallback;

pub const SPREADSHEET_HEADERS: [&str; 7] = [
    "Data Mov.",
    "Histórico",
    "Valor",
    "Cód. Conta Debito",
    "Cód. Conta Credito",
    "Cód. Histórico",
    "Código",
];

pub fn run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `statements/marco.pdf` + `20240301_101500` -> `marco_20240301_101500`
pub fn output_stem(pdf: &Path, stamp: &str) -> String {
    let name = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "statement".to_string());
    format!("{name}_{stamp}")
}

pub struct OutputPaths {
    pub spreadsheet: PathBuf,
    pub text: PathBuf,
}

pub fn output_paths(output_dir: &Path, pdf: &Path, stamp: &str) -> OutputPaths {
    let stem = output_stem(pdf, stamp);
    paths_for_stem(output_dir, &stem)
}

fn paths_for_stem(output_dir: &Path, stem: &str) -> OutputPaths {
    OutputPaths {
        spreadsheet: output_dir.join(format!("{stem}.xlsx")),
        text: output_dir.join(format!("{stem}.txt")),
    }
}

/// Like [`output_paths`], but appends `_1`, `_2`, ... after the stamp while
/// either file of the pair already exists in `output_dir`.
pub fn unused_output_paths(output_dir: &Path, pdf: &Path, stamp: &str) -> OutputPaths {
    let mut paths = output_paths(output_dir, pdf, stamp);
    let stem = output_stem(pdf, stamp);
    let mut counter = 1u32;
    while paths.spreadsheet.exists() || paths.text.exists() {
        paths = paths_for_stem(output_dir, &format!("{stem}_{counter}"));
        counter += 1;
    }
    paths
}

pub fn write_spreadsheet(
    records: &[TransactionRecord],
    path: &Path,
    fallback: AmountFallback,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in SPREADSHEET_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, record.date.as_str())?;
        sheet.write_string(row, 1, record.description.as_str())?;
        match (record.amount, fallback) {
            (Some(value), _) => {
                sheet.write_number(row, 2, value)?;
            }
            (None, AmountFallback::PassThrough) => {
                sheet.write_string(row, 2, record.raw_amount.as_str())?;
            }
            (None, AmountFallback::Null) => {}
        }
        let codes = [
            record.debit_code(),
            record.credit_code(),
            record.history_code(),
            record.generic_code,
        ];
        for (offset, code) in codes.into_iter().enumerate() {
            if let Some(code) = code {
                sheet.write_number(row, 3 + offset as u16, code as f64)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Field separators and line breaks inside a value become spaces so every
/// import line keeps exactly ten fields.
fn txt_value(text: &str) -> String {
    text.replace([';', '\n', '\r'], " ")
}

/// Fields of one import line: date, credit, debit, amount, history,
/// description, batch and three empty placeholders. Missing codes render as 0.
pub fn txt_fields(
    record: &TransactionRecord,
    batch: &str,
    fallback: AmountFallback,
) -> [String; 10] {
    let amount = match (record.amount, fallback) {
        (Some(value), _) => format_amount(value.abs()),
        (None, AmountFallback::PassThrough) => txt_value(&record.raw_amount),
        (None, AmountFallback::Null) => String::new(),
    };
    [
        record.date.clone(),
        record.credit_code().unwrap_or(0).to_string(),
        record.debit_code().unwrap_or(0).to_string(),
        amount,
        record.history_code().unwrap_or(0).to_string(),
        txt_value(&record.description),
        txt_value(batch),
        String::new(),
        String::new(),
        String::new(),
    ]
}

pub fn write_txt_to<W: Write>(
    records: &[TransactionRecord],
    out: W,
    batch: &str,
    fallback: AmountFallback,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    for record in records {
        wtr.write_record(txt_fields(record, batch, fallback))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_txt(
    records: &[TransactionRecord],
    path: &Path,
    batch: &str,
    fallback: AmountFallback,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_txt_to(records, std::io::BufWriter::new(file), batch, fallback)
}
