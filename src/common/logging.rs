use env_logger::{Builder, Env};
use std::io::Write;

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Logs at INFO by default; `RUST_LOG` overrides the level.
/// Format: `[HH:MM:SS] [LEVEL] message`
pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
