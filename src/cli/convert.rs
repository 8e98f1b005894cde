use std::path::PathBuf;

use crate::convert::convert_workbook;
use crate::error::Result;

pub fn run(file: &str, output: Option<String>) -> Result<()> {
    let input = PathBuf::from(file);
    let output = output.map(PathBuf::from).unwrap_or_else(|| input.clone());
    let result = convert_workbook(&input, &output)?;
    println!(
        "{} row(s), {} amount(s) converted. Saved {}",
        result.rows,
        result.converted,
        output.display()
    );
    Ok(())
}
