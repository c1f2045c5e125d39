use std::path::Path;

use flexi_logger::{Duplicate, FileSpec, Logger};

/// Starts logging to stderr, or to a file in `log_dir` with warnings still
/// duplicated to stderr. The `RUST_LOG` env var overrides the default `info`
/// level.
pub fn init(log_dir: Option<&Path>) {
    let logger = Logger::try_with_env_or_str("info").expect("invalid RUST_LOG value");
    let logger = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("sealbox"))
            .duplicate_to_stderr(Duplicate::Warn),
        None => logger,
    };
    let handle = logger.start().expect("can't start logger");
    // Keep the logger running until the process exits
    std::mem::forget(handle);
}
