//! Fuzz test for price history decoding and ranking
//!
//! Any JSON document must decode or fail cleanly, and a decoded history must
//! rank without panicking into types ordered by cheapest average.
//!
//! Run with: cargo +nightly fuzz run price_history_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use spotdeck_core::rank_prices;
use spotdeck_core::resources::decode_price_history;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(samples) = decode_price_history(raw) else {
        return;
    };

    let ranking = rank_prices(&samples);
    for pair in ranking.windows(2) {
        assert!(pair[0].cheapest.average.total_cmp(&pair[1].cheapest.average).is_le());
    }
    for quote in &ranking {
        assert_eq!(quote.zones.first(), Some(&quote.cheapest));
    }
});
