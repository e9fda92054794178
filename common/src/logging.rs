//! helper functions for the logging backend
use crate::util::find_project_root;
use flexi_logger::{self, writers::FileLogWriter, Duplicate, LogTarget, Logger};
use log::Level::Warn;
use std::fs;

/// Creates a logging backend.
/// All logs with level Info or higher are written to a logfile in the folder `logs` at the project
/// root, the file name starts with `discriminant` so training and serving runs stay apart.
/// All logs with level at least Info are also written to stdout.
/// Logs with level at least Error are also written to stderr.
/// The level can be overwritten via the `RUST_LOG` environment variable.
///
/// logs can be written via log::{error!, warn!, info!, debug!, trace!}
pub fn init_logging(discriminant: &str) {
    start_logging(discriminant, Duplicate::Info);
}

/// Like [init_logging], but nothing is written to stdout.
/// Use this for binaries whose stdout is consumed by other programs.
pub fn init_file_logging(discriminant: &str) {
    start_logging(discriminant, Duplicate::None);
}

fn start_logging(discriminant: &str, to_stdout: Duplicate) {
    let mut output_dir = find_project_root().unwrap_or_else(|_| ".".into());
    output_dir.push("logs");
    fs::create_dir_all(&output_dir).unwrap_or_else(|_| {});
    Logger::with_env_or_str("info")
        .format(flexi_logger::colored_opt_format)
        .log_target(LogTarget::Writer(Box::new(
            FileLogWriter::builder()
                .directory(output_dir)
                .discriminant(discriminant)
                .format(flexi_logger::opt_format)
                .try_build()
                .expect("Directory 'logs' does not exist"),
        )))
        .duplicate_to_stdout(to_stdout)
        .duplicate_to_stderr(Duplicate::Error)
        .start()
        .unwrap_or_else(|error| panic!("Logging initialization failed: {}", error));
    log_panics::init();
}

/// Creates a logging backend for use in testing
/// By default all logs with Warn or higher are printed to stdout.
/// Calling this more than once is fine.
pub fn init_test_logging() {
    if !log::log_enabled!(Warn) {
        // a second start fails if another test already installed the logger, which is fine
        let _ = Logger::with_env_or_str("warn")
            .format(flexi_logger::colored_opt_format)
            .start();
    }
}
