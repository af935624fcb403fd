use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Start logging at `base_level` (a `log` filter spec such as `"info"` or
/// `"roistat_plugin=trace"`).
///
/// Writes to rotating files in `logs/`, duplicates everything to stdout
/// and warnings to stderr. Keep the returned handle alive for as long as
/// logging is needed.
pub fn setup_logging(base_level: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    let handle = Logger::try_with_str(base_level)?
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()?;
    log::info!("logging started at level {base_level}");
    Ok(handle)
}
