//! Logging setup for applications embedding the metadata engine.
//!
//! The library itself only emits events through the `log` facade:
//!
//! - `warn`: a cap was hit and a fact was widened instead of tracked
//! - `debug`: which cascade a height change triggered, setting changes
//! - `trace`: copy-on-write detachments
//!
//! Applications that have no logger of their own can install one here.
//!
//! ```no_run
//! tablefacts::logging::init().expect("Failed to initialize logging");
//! log::info!("metadata engine ready");
//! ```

use anyhow::{Context as _, Result};

/// Environment variable consulted for the log filter (`env_logger` syntax).
pub const LOG_ENV: &str = "RUST_LOG";

/// Installs an `env_logger` backend honouring `RUST_LOG`, defaulting to `warn`.
///
/// # Errors
///
/// Fails if another logger has already been installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> Result<()> {
    init_with_level(log::LevelFilter::Warn)
}

/// Installs an `env_logger` backend with an explicit default level.
///
/// `RUST_LOG` still takes precedence when it is set.
///
/// # Errors
///
/// Fails if another logger has already been installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_with_level(level: log::LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(LOG_ENV)
        .format_timestamp_millis()
        .try_init()
        .context("Failed to initialize logger")?;

    log::debug!("Logging initialized at level {level}");
    Ok(())
}

/// Routes log output through the test harness; safe to call from every test.
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) fn init_for_tests() {
    let _ignored: std::result::Result<(), log::SetLoggerError> = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        init_for_tests();
        assert!(
            init().is_err(),
            "installing a second logger must report an error, not panic"
        );
    }
}
