use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("chain_hashmap", LevelFilter::Debug)
            .is_test(true)
            .parse_default_env();
        let _ = builder.try_init();
    });
}
