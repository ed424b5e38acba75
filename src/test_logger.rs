#![cfg(test)]

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs a test-friendly logger once per process; `RUST_LOG` overrides
/// the default `warn` level.
pub(crate) fn init_test_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .is_test(true)
            .parse_default_env();
        let _ = builder.try_init();
    });
}
