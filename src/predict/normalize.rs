//! Input normalization
//!
//! Turns a raw field mapping into the ordered numeric vector the classifier
//! expects. Total for any input shape: missing keys, wrong types, and extra
//! keys never fail the request. Lossy substitutions (unseen categories,
//! unparseable numerics) are recorded in the report and logged, not errored.

use crate::encoders::{EncoderRegistry, FeatureOrder};
use crate::{RawInput, RawValue};

/// Reserved code for categorical values the encoder has never seen
///
/// Not part of any encoder's trained vocabulary; whether the model
/// interprets it meaningfully is a modeling question, not a pipeline one.
/// Substitution volume is observable via [`NormalizeReport`].
pub const UNSEEN_SENTINEL: f32 = -1.0;

/// Record of the lossy substitutions made while normalizing one input
///
/// Surfaced to logs/observability only; the caller still gets a successful
/// prediction.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    /// (feature, raw value) pairs that took the unseen sentinel
    pub unseen: Vec<(String, String)>,
    /// (feature, raw value) pairs that failed numeric parsing and took 0.0
    pub coerced: Vec<(String, String)>,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.unseen.is_empty() && self.coerced.is_empty()
    }
}

/// Build the normalized vector for one request
///
/// Output length always equals `order.len()`; dimension i corresponds to
/// `order.names()[i]` regardless of input key order. Every entry is finite.
pub fn normalize(
    input: &RawInput,
    registry: &EncoderRegistry,
    order: &FeatureOrder,
) -> (Vec<f32>, NormalizeReport) {
    let mut vector = Vec::with_capacity(order.len());
    let mut report = NormalizeReport::default();

    for feature in order.iter() {
        let raw = input.get(feature).unwrap_or(&RawValue::Absent);

        let value = if registry.has(feature) {
            encode_categorical(feature, raw, registry, &mut report)
        } else {
            coerce_numeric(feature, raw, &mut report)
        };

        vector.push(value);
    }

    (vector, report)
}

/// Encode one categorical field, substituting the sentinel for anything the
/// encoder does not recognize (unseen label, missing value, numeric payload)
fn encode_categorical(
    feature: &str,
    raw: &RawValue,
    registry: &EncoderRegistry,
    report: &mut NormalizeReport,
) -> f32 {
    if let RawValue::Text(s) = raw {
        let trimmed = s.trim();
        if let Some(code) = registry.encode(feature, trimmed) {
            return code as f32;
        }
    }

    log::warn!("Unseen label for '{}': {:?}", feature, raw);
    report.unseen.push((feature.to_string(), raw.to_string()));
    UNSEEN_SENTINEL
}

/// Coerce one numeric field, defaulting to 0.0 for missing, empty, or
/// unparseable values
fn coerce_numeric(feature: &str, raw: &RawValue, report: &mut NormalizeReport) -> f32 {
    match raw {
        RawValue::Number(n) => {
            // Check after the f32 cast: an f64 beyond f32 range would
            // otherwise land as infinity
            let v = *n as f32;
            if v.is_finite() {
                v
            } else {
                log::warn!(
                    "Non-finite value {}={}, defaulting to 0.0",
                    feature,
                    n
                );
                report.coerced.push((feature.to_string(), n.to_string()));
                0.0
            }
        }
        RawValue::Absent => 0.0,
        RawValue::Text(s) => {
            let trimmed = s.trim();
            // "NaN" is the form layer's designated not-a-number marker;
            // matching it here also keeps a literal "nan" from parsing into
            // a real NaN and breaking the all-finite guarantee
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return 0.0;
            }
            match trimmed.parse::<f32>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    log::warn!(
                        "Could not convert {}={:?} to float, defaulting to 0.0",
                        feature,
                        s
                    );
                    report.coerced.push((feature.to_string(), s.clone()));
                    0.0
                }
            }
        }
    }
}
