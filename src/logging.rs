//! File logging setup.
//!
//! The terminal belongs to ratatui once raw mode is on, so log output goes
//! to `./sitewatch.log` in the current working directory.  Call [`init`]
//! before the terminal guard takes over the screen.

use std::fs::File;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

const LOG_FILE: &str = "./sitewatch.log";

/// Initialize the file logger.
///
/// A failure to create the log file is reported on stderr (still visible at
/// this point) and otherwise ignored: the dashboard works without logs.
pub fn init() {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    match File::create(LOG_FILE) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Info, config, file);
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file at {LOG_FILE}: {err}");
        }
    }
}
