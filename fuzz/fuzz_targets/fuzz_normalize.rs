#![no_main]

use jsonschema_canon_core::{normalize, NormalizeOptions};
use libfuzzer_sys::fuzz_target;

// Accepts arbitrary bytes, attempts to parse as JSON, feeds to normalize().
// Goal: no panics, and every successful result is already a fixed point.
fuzz_target!(|data: &[u8]| {
    let Ok(schema) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let options = NormalizeOptions::default();
    if let Ok(result) = normalize(&schema, &options) {
        let again = normalize(&result.schema, &options).expect("canonical output is a schema");
        assert_eq!(again.schema, result.schema, "normalize is not idempotent");
    }
});
