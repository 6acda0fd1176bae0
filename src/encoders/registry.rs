//! Encoder registry and feature ordering
//!
//! The two process-wide lookup tables the pipeline is built around: which
//! features are categorical (and their label tables), and the exact column
//! order the trained classifier expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::encoders::LabelEncoder;

/// Feature name to categorical encoder; features not present are numeric
///
/// Loaded once at startup and never mutated, so it is safe to share across
/// concurrently handled requests without locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an encoder for a feature (builder-style, used by tests and
    /// artifact generation)
    pub fn insert(&mut self, feature: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(feature.into(), encoder);
    }

    /// Whether this feature is categorical
    pub fn has(&self, feature: &str) -> bool {
        self.encoders.contains_key(feature)
    }

    pub fn get(&self, feature: &str) -> Option<&LabelEncoder> {
        self.encoders.get(feature)
    }

    /// Code for a label of a categorical feature; None if the feature has no
    /// encoder or the label is unseen
    pub fn encode(&self, feature: &str, label: &str) -> Option<i64> {
        self.encoders.get(feature)?.encode(label)
    }

    /// Label for a code of a categorical feature; None if the feature has no
    /// encoder or the code is out of range
    pub fn decode(&self, feature: &str, code: i64) -> Option<&str> {
        self.encoders.get(feature)?.decode(code)
    }

    /// Known labels of a categorical feature in stable code order, for
    /// populating selectable choices in the surrounding UI
    pub fn labels(&self, feature: &str) -> Option<&[String]> {
        self.encoders.get(feature).map(LabelEncoder::classes)
    }

    /// Names of all categorical features
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

/// Ordered list of feature names defining the model's input columns
///
/// Dimension i of every normalized vector corresponds to `names()[i]`.
/// Fixed length, immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOrder {
    names: Vec<String>,
}

impl FeatureOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureOrder {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of model input columns (N)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column index of a feature name
    pub fn position(&self, feature: &str) -> Option<usize> {
        self.names.iter().position(|n| n == feature)
    }

    /// Check the ordering against a registry: no duplicate columns, and
    /// every categorical feature must occupy exactly one column
    ///
    /// Violations mean the artifacts disagree with each other and the
    /// pipeline cannot produce vectors the model understands; callers treat
    /// this as fatal at startup.
    pub fn validate(&self, registry: &EncoderRegistry) -> std::result::Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature '{}' in feature order", name));
            }
        }

        for feature in registry.features() {
            if !seen.contains(feature) {
                return Err(format!(
                    "categorical feature '{}' missing from feature order",
                    feature
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> EncoderRegistry {
        let mut registry = EncoderRegistry::new();
        registry.insert("business", LabelEncoder::new(["Retail", "Services"]));
        registry.insert("demography", LabelEncoder::new(["Urban", "Rural"]));
        registry
    }

    #[test]
    fn test_has_and_labels() {
        let registry = sample_registry();

        assert!(registry.has("business"));
        assert!(!registry.has("jobs_created"));

        let labels = registry.labels("business").unwrap();
        assert_eq!(labels, ["Retail", "Services"]);
        assert_eq!(registry.labels("jobs_created"), None);
    }

    #[test]
    fn test_encode_decode_through_registry() {
        let registry = sample_registry();

        assert_eq!(registry.encode("demography", "Rural"), Some(1));
        assert_eq!(registry.decode("demography", 1), Some("Rural"));
        assert_eq!(registry.encode("demography", "Suburban"), None);
        assert_eq!(registry.encode("jobs_created", "3"), None);
    }

    #[test]
    fn test_validate_accepts_consistent_artifacts() {
        let registry = sample_registry();
        let order = FeatureOrder::new(["business", "demography", "jobs_created"]);
        assert!(order.validate(&registry).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_categorical() {
        let registry = sample_registry();
        let order = FeatureOrder::new(["business", "jobs_created"]);
        let err = order.validate(&registry).unwrap_err();
        assert!(err.contains("demography"));
    }

    #[test]
    fn test_validate_rejects_duplicate_column() {
        let registry = EncoderRegistry::new();
        let order = FeatureOrder::new(["jobs_created", "jobs_created"]);
        assert!(order.validate(&registry).is_err());
    }

    #[test]
    fn test_position_matches_order() {
        let order = FeatureOrder::new(["business", "jobs_created"]);
        assert_eq!(order.position("jobs_created"), Some(1));
        assert_eq!(order.position("missing"), None);
        assert_eq!(order.len(), 2);
    }
}
