use std::path::Path;

use calamine::{Data, Reader};
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::{GenesisError, Result};
use crate::normalizer::parse_amount;

pub const STATEMENT_HEADERS: [&str; 3] = ["Data", "Lançamento", "Valor"];

pub struct ConvertResult {
    pub rows: usize,
    pub converted: usize,
}

/// Rewrite a raw statement workbook: insert the header row and turn every
/// `1.234,56C` / `1.234,56D` text cell into a signed number. Cells that are
/// not amounts are copied unchanged.
pub fn convert_workbook(input: &Path, output: &Path) -> Result<ConvertResult> {
    let mut source = calamine::open_workbook_auto(input)?;
    let range = source
        .worksheet_range_at(0)
        .ok_or_else(|| GenesisError::Other(format!("{} has no worksheets", input.display())))??;
    drop(source);
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in STATEMENT_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let mut rows = 0usize;
    let mut converted = 0usize;
    for (i, cells) in range.rows().enumerate() {
        let row = start_row + i as u32 + 1;
        rows += 1;
        for (c, cell) in cells.iter().enumerate() {
            let col = (start_col as usize + c) as u16;
            match cell {
                Data::Empty => {}
                Data::String(s) => match parse_amount(s) {
                    Some(value) => {
                        sheet.write_number(row, col, value)?;
                        converted += 1;
                    }
                    None => {
                        sheet.write_string(row, col, s.as_str())?;
                    }
                },
                Data::Float(f) => {
                    sheet.write_number(row, col, *f)?;
                }
                Data::Int(n) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                Data::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                other => {
                    sheet.write_string(row, col, other.to_string())?;
                }
            }
        }
    }

    workbook.save(output)?;
    info!(
        "Workbook {} converted: {rows} row(s), {converted} amount(s), saved to {}",
        input.display(),
        output.display()
    );
    Ok(ConvertResult { rows, converted })
}
