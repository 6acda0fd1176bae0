//! Loan default risk prediction
//!
//! Encodes raw loan-application fields into the numeric vector a pre-trained
//! binary classifier expects, runs the classifier, and decodes the result for
//! display and storage.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod artifacts;
pub mod encoders;
pub mod model;
pub mod predict;

/// A raw scalar as submitted by the surrounding form layer
///
/// Values arrive as strings, numbers, or nothing at all; the pipeline must
/// tolerate every shape. `Absent` also stands in for an explicit JSON null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Absent,
}

impl RawValue {
    /// The string payload, if this value is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawValue::Absent)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Absent => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// Raw input as received from the form layer: field name to untyped scalar
pub type RawInput = HashMap<String, RawValue>;

/// Binary default-risk outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Likely to Default")]
    LikelyToDefault,
    #[serde(rename = "Not Likely to Default")]
    NotLikelyToDefault,
}

impl RiskLabel {
    /// Map the classifier's hard class output to a label (1 = default)
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLabel::LikelyToDefault
        } else {
            RiskLabel::NotLikelyToDefault
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::LikelyToDefault => write!(f, "Likely to Default"),
            RiskLabel::NotLikelyToDefault => write!(f, "Not Likely to Default"),
        }
    }
}

/// Full pipeline output for one request
///
/// Owned by the caller; the surrounding web layer persists it as the
/// historical prediction record (result label, score, input snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPrediction {
    pub label: RiskLabel,
    /// Class-1 probability as a percentage, rounded to 2 decimals
    pub probability_percent: f64,
    /// Human-readable snapshot of the submitted fields
    pub decoded_inputs: BTreeMap<String, RawValue>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum MudraError {
    #[error("Failed to load artifact {path}: {message}")]
    ArtifactLoad { path: String, message: String },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Unknown categorical feature: {0}")]
    UnknownFeature(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MudraError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub artifacts: ArtifactsConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub encoders_path: String,
    pub feature_order_path: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
    pub dropout: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            artifacts: ArtifactsConfig {
                encoders_path: "artifacts/encoders.json".to_string(),
                feature_order_path: "artifacts/feature_order.json".to_string(),
                // NamedMpkFileRecorder appends the .mpk extension
                model_path: "artifacts/classifier".to_string(),
            },
            model: ModelConfig {
                hidden_dims: vec![128, 64],
                dropout: 0.1,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MudraError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| MudraError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MudraError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_json_shapes() {
        let v: RawValue = serde_json::from_str("\"Retail\"").unwrap();
        assert_eq!(v, RawValue::Text("Retail".to_string()));

        let v: RawValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, RawValue::Number(3.5));

        let v: RawValue = serde_json::from_str("null").unwrap();
        assert!(v.is_absent());
    }

    #[test]
    fn test_risk_label_from_class() {
        assert_eq!(RiskLabel::from_class(1), RiskLabel::LikelyToDefault);
        assert_eq!(RiskLabel::from_class(0), RiskLabel::NotLikelyToDefault);
        assert_eq!(RiskLabel::LikelyToDefault.to_string(), "Likely to Default");
    }

    #[test]
    fn test_prediction_record_shape() {
        let mut decoded = BTreeMap::new();
        decoded.insert("business".to_string(), RawValue::from("Retail"));

        let pred = LoanPrediction {
            label: RiskLabel::NotLikelyToDefault,
            probability_percent: 12.34,
            decoded_inputs: decoded,
        };

        let json = serde_json::to_string(&pred).unwrap();
        assert!(json.contains("\"Not Likely to Default\""));
        assert!(json.contains("12.34"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.artifacts.model_path, config.artifacts.model_path);
        assert_eq!(parsed.model.hidden_dims, config.model.hidden_dims);
    }
}
