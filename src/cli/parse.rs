use std::path::{Path, PathBuf};

use crate::classifier::{classify, ReferenceTable};
use crate::cli::{print_unmatched, records_table, RunOptions};
use crate::error::Result;
use crate::pipeline::{extract_records, write_outputs};
use crate::settings::load_settings;
use crate::writer::run_stamp;

pub fn run(file: &str, options: &RunOptions) -> Result<()> {
    let mut settings = load_settings();
    options.apply(&mut settings);

    let source = Path::new(file);
    let text = std::fs::read_to_string(source)?;
    let mut extraction = extract_records(&[text], &settings);

    let table = ReferenceTable::for_settings(&settings)?;
    let result = classify(&mut extraction.records, &table);

    println!("{}", records_table(&extraction.records));
    println!(
        "{} record(s), {} classified, {} line(s) ignored",
        extraction.records.len(),
        result.matched,
        extraction.unparsed
    );
    print_unmatched(&result.unmatched);

    if options.output_dir.is_some() {
        let output_dir = PathBuf::from(&settings.output_directory);
        std::fs::create_dir_all(&output_dir)?;
        let paths = write_outputs(&extraction.records, source, &output_dir, &settings, &run_stamp())?;
        println!("Wrote {}", paths.spreadsheet.display());
        println!("Wrote {}", paths.text.display());
    }
    Ok(())
}
