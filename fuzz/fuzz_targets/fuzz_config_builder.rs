//! Fuzz target for builder.json configuration parsing.

#![no_main]

use hs_config::{validate_config, BuilderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<BuilderConfig>(data) {
        let _ = validate_config(&config);
    }
});
