//! Logger setup shared by the `dbtool` and `heatmap` binaries.

use colored::Colorize;
use env_logger::{Env, Target};
use log::warn;
use std::io::Write;

/// Installs the global logger used by [`crate::LogReporter`].
///
/// Lines go to stderr as `<timestamp> <LEVEL> <program> <message>`. The
/// filter defaults to `default_filter` and can be overridden with `RUST_LOG`.
pub fn init_logging(program: &'static str, default_filter: &str) {
    let program = program.cyan();
    if env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(move |buf, record| {
            let t = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{t} {level_style}{:<5}{level_style:#} {program} {}",
                record.level(),
                record.args()
            )
        })
        .target(Target::Stderr)
        .try_init()
        .is_err()
    {
        warn!("Unable to initialize logging -- has it already been initialized?")
    }
}
