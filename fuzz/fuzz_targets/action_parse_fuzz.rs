//! Fuzz test for the action command parser
//!
//! Arbitrary input must either be rejected with an error or parse into an
//! action whose encoding parses back to the same action.
//!
//! Run with: cargo +nightly fuzz run action_parse_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use spotdeck_core::ActionRequest;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        match input.parse::<ActionRequest>() {
            Ok(action) => {
                let encoded = action.to_string();
                let reparsed: ActionRequest = encoded
                    .parse()
                    .expect("an encoded action must parse");
                assert_eq!(reparsed, action, "encoding is not stable for {:?}", input);
                assert!(!action.prompt().is_empty());
            }
            Err(err) => {
                assert!(!err.to_string().is_empty(), "Error message should not be empty");
            }
        }
    }
});
