//! Startup artifact loading
//!
//! Three persisted artifacts are required before any prediction can be
//! served: the encoder registry, the feature order, and the classifier
//! weights (loaded separately via `Classifier::load`, since it needs a
//! backend device). Any load failure here is fatal; the process must not
//! start without a consistent artifact set.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encoders::{EncoderRegistry, FeatureOrder};
use crate::{Config, MudraError, Result};

/// The two JSON artifacts, loaded and cross-checked
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub registry: EncoderRegistry,
    pub order: FeatureOrder,
}

impl Artifacts {
    /// Load registry and feature order from the configured paths and verify
    /// they agree (fail fast on any inconsistency)
    pub fn load(config: &Config) -> Result<Self> {
        let registry: EncoderRegistry = load_json(&config.artifacts.encoders_path)?;
        let order: FeatureOrder = load_json(&config.artifacts.feature_order_path)?;

        order
            .validate(&registry)
            .map_err(|message| MudraError::ArtifactLoad {
                path: config.artifacts.feature_order_path.clone(),
                message,
            })?;

        if order.is_empty() {
            return Err(MudraError::ArtifactLoad {
                path: config.artifacts.feature_order_path.clone(),
                message: "feature order is empty".to_string(),
            });
        }

        log::debug!(
            "Loaded artifacts: {} features ({} categorical)",
            order.len(),
            registry.len()
        );

        Ok(Artifacts { registry, order })
    }
}

/// Deserialize a JSON artifact from disk
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| MudraError::ArtifactLoad {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| MudraError::ArtifactLoad {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Serialize an artifact to disk as pretty-printed JSON
pub fn save_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| MudraError::Io(std::io::Error::other(e.to_string())))?;
    std::fs::write(path, content)?;
    Ok(())
}
