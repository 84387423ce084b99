//! Fuzz target for command script replay.
//!
//! Arbitrary scripts must only ever produce rejected commands and notices,
//! never a panic, and the state registry must stay within its limit.

#![no_main]

use hs_config::BuilderConfig;
use hs_core::session::EditSession;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let config = BuilderConfig::default();
    let mut session = EditSession::new(&config);
    let summary = session.run_script(text);

    assert_eq!(summary.applied + summary.rejected, summary.commands);
    assert!(session.spec().states().len() <= config.limits.max_states);
    let _ = session.serialize();
    let _ = session.report();
});
