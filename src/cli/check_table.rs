use std::path::PathBuf;

use crate::classifier::ReferenceTable;
use crate::error::{GenesisError, Result};
use crate::settings::{load_settings, shellexpand_path};

pub fn run(path: Option<String>) -> Result<()> {
    let path = match path {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => load_settings()
            .reference_table()
            .ok_or(GenesisError::MissingReferenceTable)?,
    };

    let table = ReferenceTable::load(&path)?;
    println!("Reference table: {}", path.display());
    println!("Entries:         {}", table.len());
    println!("Skipped rows:    {}", table.skipped());
    println!(
        "Generic codes:   {}",
        if table.has_generic_codes() { "yes" } else { "no" }
    );
    if table.is_empty() {
        println!("Warning: no row has a complete set of codes.");
    }
    Ok(())
}
