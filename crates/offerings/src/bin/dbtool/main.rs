//! Initializes the offerings database and imports TSV/CSV exports into it.

use clap::Parser;
use offerings::logging::init_logging;
use offerings::{import_file, init_schema, LogReporter, Reporter};

mod cli;

use crate::cli::{Cli, Commands};

fn main() {
    // Usage errors (e.g. an unknown `--table`) exit with 1 like every other
    // failure; `--help` and `--version` still exit with 0.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        if !e.use_stderr() {
            // --help and --version
            e.exit();
        }
        e.print().unwrap_or_else(|_| eprintln!("{e}"));
        std::process::exit(1);
    });

    init_logging("dbtool", "info");
    let reporter = LogReporter;

    let ok = match cli.command {
        Commands::Init { database } => match init_schema(&database.path, &reporter) {
            Ok(()) => true,
            Err(e) => {
                reporter.error(&format!(
                    "Failed to initialize database {}: {e}",
                    database.path.display()
                ));
                false
            }
        },
        // Failures are already reported by `import_file`.
        Commands::Import(args) => import_file(&args.into(), &reporter).is_ok(),
    };

    if !ok {
        std::process::exit(1);
    }
}
