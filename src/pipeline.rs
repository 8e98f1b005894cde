use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::classifier::{classify, normalize_key, ReferenceTable};
use crate::error::Result;
use crate::models::TransactionRecord;
use crate::normalizer::normalize;
use crate::ocr::TextRecognizer;
use crate::parser::parse_page;
use crate::settings::Settings;
use crate::writer::{run_stamp, unused_output_paths, write_spreadsheet, write_txt, OutputPaths};

pub struct Extraction {
    pub records: Vec<TransactionRecord>,
    pub unparsed: usize,
}

/// Parse and normalize the recognized text of every page of one statement.
pub fn extract_records(pages: &[String], settings: &Settings) -> Extraction {
    let mut rows = Vec::new();
    let mut unparsed = 0usize;
    for page in pages {
        let outcome = parse_page(page);
        rows.extend(outcome.rows);
        unparsed += outcome.unparsed;
    }
    Extraction {
        records: normalize(rows, settings),
        unparsed,
    }
}

pub struct FileReport {
    pub records: usize,
    pub classified: usize,
    pub unparsed: usize,
    pub unmatched: Vec<String>,
    pub spreadsheet: PathBuf,
    pub text: PathBuf,
}

pub enum FileOutcome {
    Processed { path: PathBuf, report: FileReport },
    Empty { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Processed { path, .. } | Self::Empty { path } | Self::Failed { path, .. } => path,
        }
    }
}

pub struct Summary {
    pub files: Vec<FileOutcome>,
    pub unmatched: Vec<String>,
}

impl Summary {
    pub fn processed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Processed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !matches!(f, FileOutcome::Processed { .. }))
            .count()
    }
}

/// Write the spreadsheet and the import text file for one statement. An
/// existing pair with the same name is never overwritten.
pub fn write_outputs(
    records: &[TransactionRecord],
    source: &Path,
    output_dir: &Path,
    settings: &Settings,
    stamp: &str,
) -> Result<OutputPaths> {
    let paths = unused_output_paths(output_dir, source, stamp);
    write_pair(records, &paths, settings)?;
    Ok(paths)
}

/// Both files or neither: a spreadsheet whose text file failed is removed.
fn write_pair(records: &[TransactionRecord], paths: &OutputPaths, settings: &Settings) -> Result<()> {
    write_spreadsheet(records, &paths.spreadsheet, settings.amount_fallback)?;
    info!("Saved {}", paths.spreadsheet.display());
    if let Err(e) = write_txt(
        records,
        &paths.text,
        &settings.batch_number,
        settings.amount_fallback,
    ) {
        if let Err(rm) = std::fs::remove_file(&paths.spreadsheet) {
            warn!("Could not remove {}: {rm}", paths.spreadsheet.display());
        }
        return Err(e);
    }
    info!("Saved {}", paths.text.display());
    Ok(())
}

/// Classify already-extracted records and write both output files. The
/// reference table is read fresh for every call.
pub fn classify_and_write(
    mut records: Vec<TransactionRecord>,
    unparsed: usize,
    source: &Path,
    output_dir: &Path,
    settings: &Settings,
    stamp: &str,
) -> Result<FileReport> {
    let table = ReferenceTable::for_settings(settings)?;
    let classified = classify(&mut records, &table);
    let paths = write_outputs(&records, source, output_dir, settings, stamp)?;

    Ok(FileReport {
        records: records.len(),
        classified: classified.matched,
        unparsed,
        unmatched: classified.unmatched,
        spreadsheet: paths.spreadsheet,
        text: paths.text,
    })
}

/// Run one statement through OCR, extraction, classification and output.
/// Returns `Ok(None)` when no transaction survived extraction.
pub fn process_file(
    pdf: &Path,
    output_dir: &Path,
    settings: &Settings,
    recognizer: &dyn TextRecognizer,
    stamp: &str,
) -> Result<Option<FileReport>> {
    let pages = recognizer.recognize_pdf(pdf)?;
    let extraction = extract_records(&pages, settings);
    info!(
        "Extracted {} record(s) from {} ({} line(s) ignored)",
        extraction.records.len(),
        pdf.display(),
        extraction.unparsed
    );
    if extraction.records.is_empty() {
        return Ok(None);
    }
    classify_and_write(
        extraction.records,
        extraction.unparsed,
        pdf,
        output_dir,
        settings,
        stamp,
    )
    .map(Some)
}

/// Process a batch of statements one at a time. A failure in one file is
/// logged and recorded, and the batch moves on to the next file. Only an
/// unusable output directory fails the whole batch.
pub fn process(
    paths: &[PathBuf],
    output_dir: &Path,
    settings: &Settings,
    recognizer: &dyn TextRecognizer,
    mut on_progress: impl FnMut(usize, usize, &FileOutcome),
) -> Result<Summary> {
    std::fs::create_dir_all(output_dir)?;
    info!("{} file(s) selected, output to {}", paths.len(), output_dir.display());

    let total = paths.len();
    let mut files = Vec::with_capacity(total);
    let mut unmatched: Vec<String> = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        let stamp = run_stamp();
        let outcome = match process_file(path, output_dir, settings, recognizer, &stamp) {
            Ok(Some(report)) => {
                for desc in &report.unmatched {
                    if !unmatched.iter().any(|u| normalize_key(u) == normalize_key(desc)) {
                        unmatched.push(desc.clone());
                    }
                }
                FileOutcome::Processed {
                    path: path.clone(),
                    report,
                }
            }
            Ok(None) => {
                error!("No transactions found in {}", path.display());
                FileOutcome::Empty { path: path.clone() }
            }
            Err(e) => {
                error!("Error processing {}: {e}", path.display());
                FileOutcome::Failed {
                    path: path.clone(),
                    error: e.to_string(),
                }
            }
        };
        on_progress(index + 1, total, &outcome);
        files.push(outcome);
    }

    Ok(Summary { files, unmatched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenesisError;
    use crate::settings::CodeSource;
    use std::collections::HashMap;

    struct CannedText(HashMap<PathBuf, Vec<String>>);

    impl TextRecognizer for CannedText {
        fn recognize_pdf(&self, pdf: &Path) -> Result<Vec<String>> {
            self.0
                .get(pdf)
                .cloned()
                .ok_or_else(|| GenesisError::Ocr(format!("cannot open {}", pdf.display())))
        }
    }

    fn embedded_settings() -> Settings {
        Settings {
            code_source: CodeSource::Embedded,
            ..Settings::default()
        }
    }

    #[test]
    fn test_extract_records_end_to_end() {
        let pages = vec![
            "EXTRATO\n01/03/2024   PAGAMENTO FORNECEDOR XYZ   1.500,00D\n".to_string(),
            "02/03/2024 SALDO DO DIA 3.000,00C\n03/03/2024 0042 DEB ISSQN 0,00D\n".to_string(),
        ];
        let extraction = extract_records(&pages, &Settings::default());
        assert_eq!(extraction.unparsed, 1);
        assert_eq!(extraction.records.len(), 1);
        let r = &extraction.records[0];
        assert_eq!(r.date, "01/03/2024");
        assert_eq!(r.description, "PAGAMENTO FORNECEDOR XYZ");
        assert_eq!(r.amount, Some(-1500.0));
    }

    #[test]
    fn test_process_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = PathBuf::from("/statements/lot.pdf");
        let blank = PathBuf::from("/statements/blank.pdf");
        let missing = PathBuf::from("/statements/missing.pdf");
        let recognizer = CannedText(HashMap::from([
            (
                good.clone(),
                vec!["01/03/2024 DEB ISSQN 45,10D\n02/03/2024 TARIFA AVULSA 9,90D\n02/03/2024 tarifa avulsa 9,90D".to_string()],
            ),
            (blank.clone(), vec!["nothing here".to_string()]),
        ]));

        let mut progress = Vec::new();
        let summary = process(
            &[missing.clone(), good.clone(), blank.clone()],
            dir.path(),
            &embedded_settings(),
            &recognizer,
            |i, total, _| progress.push((i, total)),
        )
        .unwrap();

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.failed(), 2);
        assert!(matches!(summary.files[0], FileOutcome::Failed { .. }));
        assert!(matches!(summary.files[2], FileOutcome::Empty { .. }));
        assert_eq!(summary.files[1].path(), good.as_path());
        assert_eq!(summary.unmatched, vec!["TARIFA AVULSA".to_string()]);

        let FileOutcome::Processed { report, .. } = &summary.files[1] else {
            panic!("expected a processed file");
        };
        assert_eq!(report.records, 3);
        assert_eq!(report.classified, 1);
        assert!(report.spreadsheet.exists());
        let text = std::fs::read_to_string(&report.text).unwrap();
        assert!(text.starts_with("01/03/2024;9;215;45,10;10;DEB ISSQN;1;;;\n"));
        assert!(text.contains("02/03/2024;0;0;9,90;0;TARIFA AVULSA;1;;;"));
    }

    #[test]
    fn test_same_file_name_in_two_folders_keeps_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let jan = PathBuf::from("/jan/extrato.pdf");
        let fev = PathBuf::from("/fev/extrato.pdf");
        let recognizer = CannedText(HashMap::from([
            (jan.clone(), vec!["05/01/2024 DEB ISSQN 45,10D".to_string()]),
            (fev.clone(), vec!["01/02/2024 DP DIN LOT 20,00C".to_string()]),
        ]));

        let summary = process(&[jan, fev], dir.path(), &embedded_settings(), &recognizer, |_, _, _| {})
            .unwrap();
        assert_eq!(summary.processed(), 2);

        let texts: Vec<PathBuf> = summary
            .files
            .iter()
            .map(|f| match f {
                FileOutcome::Processed { report, .. } => report.text.clone(),
                _ => panic!("expected a processed file"),
            })
            .collect();
        assert_ne!(texts[0], texts[1]);
        assert_eq!(
            std::fs::read_to_string(&texts[0]).unwrap(),
            "05/01/2024;9;215;45,10;10;DEB ISSQN;1;;;\n"
        );
        assert_eq!(
            std::fs::read_to_string(&texts[1]).unwrap(),
            "01/02/2024;9;289;20,00;10;DP DIN LOT;1;;;\n"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_failed_text_file_removes_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths {
            spreadsheet: dir.path().join("extrato.xlsx"),
            text: dir.path().join("missing").join("extrato.txt"),
        };
        let records = extract_records(&["01/03/2024 DEB ISSQN 45,10D".to_string()], &Settings::default())
            .records;

        assert!(write_pair(&records, &paths, &Settings::default()).is_err());
        assert!(!paths.spreadsheet.exists());
        assert!(!paths.text.exists());
    }

    #[test]
    fn test_missing_reference_table_fails_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = PathBuf::from("a.pdf");
        let b = PathBuf::from("b.pdf");
        let page = vec!["01/03/2024 DEB ISSQN 45,10D".to_string()];
        let recognizer = CannedText(HashMap::from([(a.clone(), page.clone()), (b.clone(), page)]));

        let summary = process(&[a, b], dir.path(), &Settings::default(), &recognizer, |_, _, _| {})
            .unwrap();
        assert_eq!(summary.processed(), 0);
        for file in &summary.files {
            match file {
                FileOutcome::Failed { error, .. } => assert!(error.contains("reference table")),
                _ => panic!("expected failure"),
            }
        }
    }
}
