use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use offerings::{ImportOptions, SourceFormat, Table, DEFAULT_DATABASE_PATH};

const IMPORT_LONG_HELP: &str = indoc::indoc! {"
    If -k or --with-no-header is specified, the source file has no header line.
    In this case, the columns must appear in the following order:
      instance_type_offerings: InstanceType, LocationType, Location
      az                     : ZoneId, ZoneName, RegionName, ZoneType, State
"};

#[derive(Parser)]
#[command(
    name = "dbtool",
    about = "A tool to manage the EC2 instance type offerings database.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database.
    ///
    /// Creates the `az` and `instance_type_offerings` tables unless they
    /// already exist.
    Init {
        #[command(flatten)]
        database: DatabaseArg,
    },
    /// Import a TSV or CSV file into one of the tables.
    #[command(after_long_help = IMPORT_LONG_HELP)]
    Import(ImportArgs),
}

#[derive(Args)]
pub struct DatabaseArg {
    /// Path to the SQLite database.
    #[arg(
        short = 'd',
        long = "database",
        env = "OFFERINGS_DATABASE",
        value_hint = ValueHint::FilePath,
        default_value = DEFAULT_DATABASE_PATH
    )]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Table to import into.
    #[arg(short = 't', long, value_enum)]
    pub table: Table,
    /// Source file to import.
    #[arg(short = 'f', long, value_hint = ValueHint::FilePath)]
    pub source_file: PathBuf,
    /// The source file has no header line.
    #[arg(short = 'k', long)]
    pub with_no_header: bool,
    /// Format of the source file.
    #[arg(
        long = "fmt",
        visible_alias = "format",
        value_enum,
        default_value_t = SourceFormat::Tsv
    )]
    pub format: SourceFormat,
    #[command(flatten)]
    pub database: DatabaseArg,
}

impl From<ImportArgs> for ImportOptions {
    fn from(args: ImportArgs) -> Self {
        ImportOptions {
            database: args.database.path,
            table: args.table,
            source_file: args.source_file,
            with_no_header: args.with_no_header,
            format: args.format,
        }
    }
}
