//! Fuzz target: TOML config parsing + validation
//!
//! Arbitrary documents must either fail cleanly or produce a config
//! that, once validated, has a usable capacity and tick period.
//!
//! cargo fuzz run fuzz_config_toml

#![no_main]

use gatekeeper::adapters::config_file::parse_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = parse_config(text) {
        if cfg.validate().is_ok() {
            assert!(cfg.capacity >= 1);
            assert!(cfg.tick_interval_ms >= 1);
        }
    }
});
