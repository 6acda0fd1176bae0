//! Binary default-risk classifier
//!
//! Architecture: Input(N) → Hidden1 → ReLU → Dropout
//!                        → Hidden2 → ReLU → Dropout (optional)
//!                        → logit_head(1)

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::{ModelConfig, MudraError, Result};

/// Configuration for the classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Input dimension; must equal the feature order length
    pub input_dim: usize,
    /// Hidden layer dimensions (one or two layers)
    pub hidden_dims: Vec<usize>,
    /// Dropout rate (inactive at inference)
    pub dropout: f64,
}

impl ClassifierConfig {
    pub fn new(input_dim: usize) -> Self {
        ClassifierConfig {
            input_dim,
            hidden_dims: vec![128, 64],
            dropout: 0.1,
        }
    }

    /// Build from the application config plus the feature order length
    pub fn from_model_config(model: &ModelConfig, input_dim: usize) -> Self {
        ClassifierConfig {
            input_dim,
            hidden_dims: model.hidden_dims.clone(),
            dropout: model.dropout,
        }
    }
}

/// A single hidden layer block: Linear → ReLU → Dropout
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
    dropout: Dropout,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize, dropout: f64) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
            dropout: DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        let x = relu(x);
        self.dropout.forward(x)
    }
}

/// MLP binary classifier
///
/// Outputs a single logit per row; apply sigmoid for P(default).
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    hidden1: HiddenBlock<B>,
    hidden2: Option<HiddenBlock<B>>,
    logit_head: Linear<B>,
}

impl<B: Backend> Classifier<B> {
    /// Create a classifier with freshly initialized weights
    pub fn new(device: &B::Device, config: ClassifierConfig) -> Self {
        let hidden1 = HiddenBlock::new(
            device,
            config.input_dim,
            config.hidden_dims.first().copied().unwrap_or(64),
            config.dropout,
        );

        let (hidden2, head_input_dim) = if config.hidden_dims.len() > 1 {
            let h2 = HiddenBlock::new(
                device,
                config.hidden_dims[0],
                config.hidden_dims[1],
                config.dropout,
            );
            (Some(h2), config.hidden_dims[1])
        } else {
            (None, config.hidden_dims.first().copied().unwrap_or(64))
        };

        Classifier {
            hidden1,
            hidden2,
            logit_head: LinearConfig::new(head_input_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Normalized feature vectors [batch, input_dim]
    ///
    /// # Returns
    /// Logits [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden1.forward(features);
        let x = if let Some(h2) = &self.hidden2 {
            h2.forward(x)
        } else {
            x
        };
        self.logit_head.forward(x)
    }

    /// Class-1 probabilities [batch, 1], each in [0, 1]
    pub fn predict_proba(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.forward(features))
    }

    /// Save weights to a recorder file
    pub fn save(&self, path: &str) -> Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| MudraError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load weights from a recorder file
    ///
    /// The config must describe the same architecture the weights were saved
    /// with; a mismatch fails here, at startup, not per request.
    pub fn load(device: &B::Device, path: &str, config: ClassifierConfig) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| MudraError::ArtifactLoad {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let config = ClassifierConfig::new(18);
        let model = Classifier::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [4, 18],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let logits = model.forward(features);
        assert_eq!(logits.dims(), [4, 1]);
    }

    #[test]
    fn test_proba_in_unit_interval() {
        let device = Default::default();
        let config = ClassifierConfig::new(6);
        let model = Classifier::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [8, 6],
            burn::tensor::Distribution::Normal(0.0, 10.0),
            &device,
        );

        let proba = model.predict_proba(features).to_data();
        for p in proba.as_slice::<f32>().unwrap() {
            assert!(*p >= 0.0 && *p <= 1.0, "probability out of range: {}", p);
        }
    }

    #[test]
    fn test_single_hidden_layer() {
        let device = Default::default();
        let config = ClassifierConfig {
            input_dim: 6,
            hidden_dims: vec![16],
            dropout: 0.1,
        };
        let model = Classifier::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [2, 6],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let logits = model.forward(features);
        assert_eq!(logits.dims(), [2, 1]);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let device = Default::default();
        let config = ClassifierConfig {
            input_dim: 4,
            hidden_dims: vec![8],
            dropout: 0.0,
        };
        let model = Classifier::<TestBackend>::new(&device, config.clone());

        let dir = std::env::temp_dir().join("mudra-classifier-roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("classifier").to_string_lossy().into_owned();
        model.save(&path).unwrap();

        let loaded = Classifier::<TestBackend>::load(&device, &path, config).unwrap();

        let features = Tensor::<TestBackend, 2>::from_floats([[0.5, -1.0, 2.0, 0.0]], &device);
        let before = model.forward(features.clone()).to_data();
        let after = loaded.forward(features).to_data();
        assert_eq!(
            before.as_slice::<f32>().unwrap(),
            after.as_slice::<f32>().unwrap()
        );
    }
}
