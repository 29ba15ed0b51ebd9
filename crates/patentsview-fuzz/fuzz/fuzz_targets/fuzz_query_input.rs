#![no_main]

use libfuzzer_sys::fuzz_target;
use patentsview_fetch::{Query, QueryInput};

fuzz_target!(|data: &[u8]| {
    // Validation must reject bad input with an error, never a panic
    if let Ok(input) = serde_json::from_slice::<QueryInput>(data) {
        if let Ok(query) = Query::try_from(input) {
            let _ = query.request_body(1);
            let _ = query.range().split_by_months(12);
        }
    }
});
