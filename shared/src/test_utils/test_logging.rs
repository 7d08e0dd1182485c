use env_logger::Builder;
use log::LevelFilter;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary.
///
/// Only errors are shown unless LOG_LEVEL is set (error, warn, info, debug, trace).
/// Call it at the start of tests that need store or handler logs.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|value| value.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Error);

        // Another test harness may already own the global logger
        let _ = Builder::from_default_env()
            .filter_level(level)
            .is_test(true)
            .try_init();
    });
}
