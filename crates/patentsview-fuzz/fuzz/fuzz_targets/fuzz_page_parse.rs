#![no_main]

use libfuzzer_sys::fuzz_target;
use patentsview_fetch::models::Page;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must parse or fail, never panic
    if let Ok(page) = serde_json::from_slice::<Page>(data) {
        let _ = page.pages_needed(1);
        let _ = page.pages_needed(10_000);
        let _ = page.into_records();
    }
});
