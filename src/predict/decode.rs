//! Output decoding
//!
//! Best-effort translation of the submitted fields back to human-readable
//! form for the stored/displayed record. Never fails a request; anything
//! that cannot be decoded falls back to the raw value.

use std::collections::BTreeMap;

use crate::encoders::EncoderRegistry;
use crate::{RawInput, RawValue};

/// Decode every submitted field
///
/// Strings on categorical fields were never encoded, so they pass through
/// unchanged. Numeric codes on categorical fields are mapped back to their
/// label where possible; out-of-range codes (including the unseen sentinel)
/// keep the raw value. Every input key appears in the output.
pub fn decode_inputs(input: &RawInput, registry: &EncoderRegistry) -> BTreeMap<String, RawValue> {
    let mut decoded = BTreeMap::new();

    for (field, raw) in input {
        let value = if registry.has(field) {
            decode_field(field, raw, registry)
        } else {
            raw.clone()
        };
        decoded.insert(field.clone(), value);
    }

    decoded
}

fn decode_field(field: &str, raw: &RawValue, registry: &EncoderRegistry) -> RawValue {
    match raw {
        // Already human-readable
        RawValue::Text(_) | RawValue::Absent => raw.clone(),
        RawValue::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                if let Some(label) = registry.decode(field, *n as i64) {
                    return RawValue::Text(label.to_string());
                }
            }
            log::debug!("Could not decode {}={} back to a label", field, n);
            raw.clone()
        }
    }
}
