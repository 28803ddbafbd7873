// src/logging.rs

use flexi_logger::{DeferredNow, Logger, LoggerHandle};
use log::Record;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

fn format_line(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Start stderr logging at `info` (overridable via RUST_LOG). Idempotent;
/// never panics — a second init or a broken TTY just leaves logging off.
pub fn init() {
    let _ = LOGGER.get_or_try_init(|| {
        Logger::try_with_env_or_str("info")
            .map_err(|e| e.to_string())?
            .format(format_line)
            .log_to_stderr()
            .start()
            .map_err(|e| e.to_string())
    });
}
