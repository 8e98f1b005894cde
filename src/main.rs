mod classifier;
mod cli;
mod convert;
mod error;
mod logging;
mod models;
mod normalizer;
mod ocr;
mod parser;
mod pipeline;
mod settings;
mod writer;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(&PathBuf::from(settings::load_settings().log_file));

    let result = match cli.command {
        Commands::Init {
            output_dir,
            reference_table,
        } => cli::init::run(output_dir, reference_table),
        Commands::Process { files, options } => cli::process::run(&files, &options),
        Commands::Parse { file, options } => cli::parse::run(&file, &options),
        Commands::Convert { file, output } => cli::convert::run(&file, output),
        Commands::CheckTable { path } => cli::check_table::run(path),
        Commands::Status => {
            cli::status::run();
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
