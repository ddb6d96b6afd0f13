use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::Level;
use offerings::db::{count_rows, offerings, open, zones};
use offerings::import::SHAPE_HINT;
use offerings::{
    import_file, init_schema, ImportError, ImportOptions, MemoryReporter, Offering, SourceFormat,
    Table, Zone,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    database: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("instance_type_offerings.db");
        init_schema(&database, &MemoryReporter::new()).unwrap();
        Self { dir, database }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn options(&self, table: Table, source_file: &Path) -> ImportOptions {
        ImportOptions {
            database: self.database.clone(),
            table,
            source_file: source_file.to_path_buf(),
            with_no_header: false,
            format: SourceFormat::Tsv,
        }
    }

    fn count(&self, table: Table) -> usize {
        count_rows(&open(&self.database).unwrap(), table).unwrap()
    }
}

fn dbtool(cwd: &Path, args: &[&str]) -> i32 {
    Command::new(env!("CARGO_BIN_EXE_dbtool"))
        .current_dir(cwd)
        .env_remove("OFFERINGS_DATABASE")
        .args(args)
        .output()
        .unwrap()
        .status
        .code()
        .unwrap()
}

#[test]
fn imports_offerings_with_header() {
    let ws = Workspace::new();
    let source = ws.write(
        "offerings.tsv",
        "InstanceType\tLocationType\tLocation\n\
         t3.micro\tavailability-zone\tus-east-1a\n\
         m5.large\tavailability-zone\tus-east-1b\n",
    );

    let reporter = MemoryReporter::new();
    let inserted = import_file(&ws.options(Table::InstanceTypeOfferings, &source), &reporter);
    assert_eq!(inserted.unwrap(), 2);
    assert!(reporter.contains(Level::Info, "Inserted 2 rows into instance_type_offerings"));
    assert!(reporter.messages(Level::Error).is_empty());

    let stored = offerings(&open(&ws.database).unwrap()).unwrap();
    assert_eq!(
        stored[0],
        Offering {
            instance_type: "t3.micro".to_string(),
            location_type: "availability-zone".to_string(),
            location: "us-east-1a".to_string(),
        }
    );
}

#[test]
fn extra_columns_are_left_out() {
    let ws = Workspace::new();
    let source = ws.write(
        "availability.tsv",
        "InstanceType\tLocationType\tLocation\tExistsInLocation\n\
         t3.micro\tregion\tus-east-1\t1\n\
         t3.micro\tregion\tus-west-2\t0\n",
    );

    let reporter = MemoryReporter::new();
    let inserted = import_file(&ws.options(Table::InstanceTypeOfferings, &source), &reporter);
    assert_eq!(inserted.unwrap(), 2);

    let stored = offerings(&open(&ws.database).unwrap()).unwrap();
    let locations: Vec<&str> = stored.iter().map(|o| o.location.as_str()).collect();
    assert_eq!(locations, vec!["us-east-1", "us-west-2"]);
}

#[test]
fn imports_headerless_zones_by_position() {
    let ws = Workspace::new();
    let source = ws.write(
        "az.csv",
        "use1-az1,us-east-1a,us-east-1,availability-zone,available\n",
    );

    let mut options = ws.options(Table::Az, &source);
    options.with_no_header = true;
    options.format = SourceFormat::Csv;
    assert_eq!(import_file(&options, &MemoryReporter::new()).unwrap(), 1);

    assert_eq!(
        zones(&open(&ws.database).unwrap()).unwrap(),
        vec![Zone {
            zone_id: "use1-az1".to_string(),
            zone_name: "us-east-1a".to_string(),
            region_name: "us-east-1".to_string(),
            zone_type: "availability-zone".to_string(),
            state: "available".to_string(),
        }]
    );
}

#[rstest]
#[case::wrong_columns("ZoneId\tZoneName\n1\t2\n")]
#[case::missing_column("InstanceType\tLocation\tExtra\nt3.micro\tus-east-1a\tx\n")]
#[case::uneven_extras("InstanceType\tLocationType\tLocation\tExtra\nt3.micro\taz\tus-east-1a\tx\tz\n")]
#[case::ragged_row("InstanceType\tLocationType\tLocation\nt3.micro\taz\n")]
#[case::empty_value("InstanceType\tLocationType\tLocation\nt3.micro\t\tus-east-1a\n")]
fn shape_errors_insert_nothing(#[case] contents: &str) {
    let ws = Workspace::new();
    let source = ws.write("bad.tsv", contents);

    let reporter = MemoryReporter::new();
    let err = import_file(&ws.options(Table::InstanceTypeOfferings, &source), &reporter)
        .unwrap_err();
    assert!(err.is_shape_error(), "{err}");
    assert_eq!(reporter.messages(Level::Error)[0], SHAPE_HINT);
    assert_eq!(ws.count(Table::InstanceTypeOfferings), 0);
}

#[test]
fn headerless_short_row_names_the_line() {
    let ws = Workspace::new();
    let source = ws.write(
        "az.tsv",
        "use1-az1\tus-east-1a\tus-east-1\tavailability-zone\tavailable\n\
         use1-az2\tus-east-1b\tus-east-1\n",
    );

    let mut options = ws.options(Table::Az, &source);
    options.with_no_header = true;
    let err = import_file(&options, &MemoryReporter::new()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::ShortRow {
            line: 2,
            expected: 5,
            found: 3
        }
    ));
    assert_eq!(ws.count(Table::Az), 0);
}

#[test]
fn duplicate_rows_roll_back_the_whole_file() {
    let ws = Workspace::new();
    let source = ws.write(
        "offerings.tsv",
        "InstanceType\tLocationType\tLocation\n\
         t3.micro\tavailability-zone\tus-east-1a\n\
         t3.micro\tavailability-zone\tus-east-1a\n",
    );

    let reporter = MemoryReporter::new();
    let err = import_file(&ws.options(Table::InstanceTypeOfferings, &source), &reporter)
        .unwrap_err();
    assert!(matches!(err, ImportError::Conflict { .. }));
    assert!(!err.is_shape_error());
    assert!(!reporter.contains(Level::Error, SHAPE_HINT));
    assert!(reporter.contains(Level::Error, "Duplicate primary key"));
    assert_eq!(ws.count(Table::InstanceTypeOfferings), 0);
}

#[test]
fn header_only_file_inserts_zero_rows() {
    let ws = Workspace::new();
    let source = ws.write("empty.tsv", "ZoneId\tZoneName\tRegionName\tZoneType\tState\n");

    let reporter = MemoryReporter::new();
    assert_eq!(import_file(&ws.options(Table::Az, &source), &reporter).unwrap(), 0);
    assert!(reporter.contains(Level::Warn, "No data rows"));
}

#[test]
fn missing_source_is_reported() {
    let ws = Workspace::new();
    let source = ws.dir.path().join("nope.tsv");

    let reporter = MemoryReporter::new();
    let err = import_file(&ws.options(Table::Az, &source), &reporter).unwrap_err();
    assert!(matches!(err, ImportError::SourceNotFound(_)));
    assert!(reporter.contains(Level::Error, "File not found"));
}

#[test]
fn cli_init_then_import() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("offerings.tsv"),
        "InstanceType\tLocationType\tLocation\nt3.micro\tregion\tus-east-1\n",
    )
    .unwrap();

    assert_eq!(dbtool(dir.path(), &["init"]), 0);
    assert_eq!(dbtool(dir.path(), &["init"]), 0);
    let import = [
        "import",
        "-t",
        "instance_type_offerings",
        "-f",
        "offerings.tsv",
    ];
    assert_eq!(dbtool(dir.path(), &import), 0);
    // The same rows again collide with the stored ones.
    assert_eq!(dbtool(dir.path(), &import), 1);

    let conn = open(&dir.path().join("instance_type_offerings.db")).unwrap();
    assert_eq!(count_rows(&conn, Table::InstanceTypeOfferings).unwrap(), 1);
}

#[test]
fn cli_failures_exit_with_one() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("custom.db");
    let db = db.to_str().unwrap();

    // Missing source file: the database is not created either.
    let missing = ["import", "-t", "az", "-f", "missing.tsv", "-d", db];
    assert_eq!(dbtool(dir.path(), &missing), 1);
    assert!(!Path::new(db).exists());

    assert_eq!(dbtool(dir.path(), &["init", "--database", db]), 0);
    fs::write(dir.path().join("az.tsv"), "ZoneId\nuse1-az1\n").unwrap();
    let invalid_table = ["import", "-t", "regions", "-f", "az.tsv", "-d", db];
    assert_eq!(dbtool(dir.path(), &invalid_table), 1);
    let bad_shape = ["import", "-t", "az", "-f", "az.tsv", "-d", db];
    assert_eq!(dbtool(dir.path(), &bad_shape), 1);

    assert_eq!(dbtool(dir.path(), &["--help"]), 0);
    assert_eq!(dbtool(dir.path(), &["--version"]), 0);
}
