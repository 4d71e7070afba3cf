//! Logging utilities and structured logging support

pub use log::LevelFilter;

/// Initialize the logging system with a default level filter
///
/// `RUST_LOG` still overrides the filter when it is set. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

/// Initialize logging for unit tests (captured by the test harness)
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
