use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(output_dir: Option<String>, reference_table: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = output_dir {
        settings.output_directory = shellexpand_path(&dir);
    }
    if let Some(path) = reference_table {
        settings.reference_table_path = shellexpand_path(&path);
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.output_directory);
    std::fs::create_dir_all(&resolved)?;

    println!("Output directory: {}", resolved.display());
    if settings.reference_table_path.is_empty() {
        println!("Reference table:  (not set, pass --reference-table or use --embedded-codes)");
    } else {
        println!("Reference table:  {}", settings.reference_table_path);
    }
    println!("Settings saved.");
    Ok(())
}
