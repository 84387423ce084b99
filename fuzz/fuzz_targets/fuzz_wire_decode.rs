//! Fuzz target for wire map decoding.

#![no_main]

use hs_core::serialize::WireMap;
use hs_core::wire::decode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|map: WireMap| {
    // Should never panic, only return an error
    let _ = decode(&map);
});
