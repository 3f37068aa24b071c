//! Property tests for action dispatch and pass merging.

use proptest::prelude::*;
use spotdeck_engine::{dispatch, RefreshPass};
use spotdeck_test_utils::generators::{arb_action_request, arb_refresh_pass};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: declining any well-formed action yields no pass
    #[test]
    fn prop_decline_yields_no_pass(action in arb_action_request()) {
        let encoded = action.to_string();
        prop_assert_eq!(dispatch(&encoded, |_| false), Ok(None));
    }

    /// Property: confirming carries exactly the parsed action and forces nothing yet
    #[test]
    fn prop_confirm_carries_action(action in arb_action_request()) {
        let encoded = action.to_string();
        let pass = dispatch(&encoded, |_| true).unwrap().unwrap();
        prop_assert_eq!(pass.preceding_action, Some(action));
        prop_assert!(pass.invalidated.is_empty());
    }

    /// Property: merging never loses an invalidation and keeps the latest action
    #[test]
    fn prop_merge_accumulates(first in arb_refresh_pass(), second in arb_refresh_pass()) {
        let mut merged: RefreshPass = first.clone();
        merged.merge(second.clone());

        for category in first.invalidated.iter().chain(second.invalidated.iter()) {
            prop_assert!(merged.invalidated.contains(category));
        }
        let expected = second.preceding_action.or(first.preceding_action);
        prop_assert_eq!(merged.preceding_action, expected);
    }
}
