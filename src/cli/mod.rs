pub mod check_table;
pub mod convert;
pub mod init;
pub mod parse;
pub mod process;
pub mod status;

use clap::{Args, Parser, Subcommand};
use comfy_table::{Cell, Table};

use crate::models::TransactionRecord;
use crate::normalizer::format_amount;
use crate::settings::{shellexpand_path, CodeSource, Settings};

#[derive(Parser)]
#[command(
    name = "genesis",
    about = "Extract transactions from scanned bank statements and assign accounting codes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Per-invocation overrides of the saved settings.
#[derive(Args, Clone, Default)]
pub struct RunOptions {
    /// Directory for the generated spreadsheet and text files
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,
    /// Reference workbook mapping descriptions to accounting codes
    #[arg(long = "reference-table", conflicts_with = "embedded_codes")]
    pub reference_table: Option<String>,
    /// Use the built-in lottery-agency code table instead of a workbook
    #[arg(long = "embedded-codes")]
    pub embedded_codes: bool,
}

impl RunOptions {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_directory = shellexpand_path(dir);
        }
        if let Some(path) = &self.reference_table {
            settings.reference_table_path = shellexpand_path(path);
            settings.code_source = CodeSource::ReferenceTable;
        }
        if self.embedded_codes {
            settings.code_source = CodeSource::Embedded;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save default settings and create the output directory.
    Init {
        /// Directory for generated files (default: ~/Documents/genesis)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Reference workbook with description and code columns
        #[arg(long = "reference-table")]
        reference_table: Option<String>,
    },
    /// OCR scanned statement PDFs and write a spreadsheet and import file for each.
    Process {
        /// Statement PDFs to process, in order
        #[arg(required = true)]
        files: Vec<String>,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Extract and classify transactions from already-recognized text.
    Parse {
        /// Text file with one statement line per line
        file: String,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Add the header row to a statement workbook and convert C/D amounts to numbers.
    Convert {
        /// Workbook to convert
        file: String,
        /// Where to save the result (default: overwrite the input)
        #[arg(long)]
        output: Option<String>,
    },
    /// Validate the reference table and show how many codes it holds.
    CheckTable {
        /// Reference workbook (default: the one in settings)
        path: Option<String>,
    },
    /// Show settings and whether the OCR tools are installed.
    Status,
}

pub(crate) fn code_cell(code: Option<i64>) -> Cell {
    Cell::new(code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()))
}

pub(crate) fn records_table(records: &[TransactionRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Debit", "Credit", "History"]);
    for r in records {
        let amount = r
            .amount
            .map(format_amount)
            .unwrap_or_else(|| r.raw_amount.clone());
        table.add_row(vec![
            Cell::new(&r.date),
            Cell::new(&r.description),
            Cell::new(amount),
            code_cell(r.debit_code()),
            code_cell(r.credit_code()),
            code_cell(r.history_code()),
        ]);
    }
    table
}

pub(crate) fn print_unmatched(unmatched: &[String]) {
    if unmatched.is_empty() {
        return;
    }
    println!("\nNot found in the reference table ({}):", unmatched.len());
    for desc in unmatched {
        println!("  {desc}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_override_settings() {
        let mut settings = Settings {
            code_source: CodeSource::Embedded,
            ..Settings::default()
        };
        let options = RunOptions {
            output_dir: Some("/tmp/genesis-out".to_string()),
            reference_table: Some("/tmp/base.xlsx".to_string()),
            embedded_codes: false,
        };
        options.apply(&mut settings);
        assert_eq!(settings.output_directory, "/tmp/genesis-out");
        assert_eq!(settings.reference_table_path, "/tmp/base.xlsx");
        assert_eq!(settings.code_source, CodeSource::ReferenceTable);
    }

    #[test]
    fn test_embedded_flag() {
        let mut settings = Settings::default();
        RunOptions {
            embedded_codes: true,
            ..RunOptions::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.code_source, CodeSource::Embedded);
    }

    #[test]
    fn test_cli_parses_process() {
        let cli = Cli::try_parse_from([
            "genesis", "process", "a.pdf", "b.pdf", "--embedded-codes", "--output-dir", "/tmp/x",
        ])
        .unwrap();
        match cli.command {
            Commands::Process { files, options } => {
                assert_eq!(files, vec!["a.pdf", "b.pdf"]);
                assert!(options.embedded_codes);
                assert_eq!(options.output_dir.as_deref(), Some("/tmp/x"));
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_code_sources() {
        let result = Cli::try_parse_from([
            "genesis", "parse", "page.txt", "--embedded-codes", "--reference-table", "base.xlsx",
        ]);
        assert!(result.is_err());
    }
}
