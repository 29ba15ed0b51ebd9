#![no_main]

use libfuzzer_sys::fuzz_target;
use patentsview_fetch::FieldSelection;
use patentsview_fetch::models::Page;
use patentsview_fetch::tables::flatten;
use patentsview_fuzz::FUZZ_FIELDS;

fuzz_target!(|data: &[u8]| {
    let Ok(page) = serde_json::from_slice::<Page>(data) else {
        return;
    };
    let Ok(selection) = FieldSelection::new(FUZZ_FIELDS) else {
        return;
    };

    // Whatever shape the records have, tables stay rectangular
    let tables = flatten(&page.into_records(), &selection);
    for table in tables.values() {
        for row in table.rows() {
            assert_eq!(row.len(), table.columns().len());
        }
    }
});
