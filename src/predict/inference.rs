//! Model inference for predictions

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::artifacts::Artifacts;
use crate::encoders::{EncoderRegistry, FeatureOrder};
use crate::model::{Classifier, ClassifierConfig};
use crate::predict::{decode_inputs, normalize};
use crate::{Config, LoanPrediction, MudraError, RawInput, Result, RiskLabel};

/// Predictor for loan default risk
///
/// Bundles the loaded classifier, encoder registry, and feature order into
/// the one process-wide context object. Constructed once at startup,
/// immutable afterwards, safe to share across concurrent requests.
pub struct Predictor<B: Backend> {
    model: Classifier<B>,
    registry: EncoderRegistry,
    order: FeatureOrder,
    device: B::Device,
    input_dim: usize,
}

impl<B: Backend> Predictor<B> {
    /// Create a predictor from already-loaded components
    pub fn new(
        model: Classifier<B>,
        registry: EncoderRegistry,
        order: FeatureOrder,
        device: B::Device,
    ) -> Self {
        let input_dim = order.len();
        Predictor {
            model,
            registry,
            order,
            device,
            input_dim,
        }
    }

    /// Load a predictor from the configured artifact paths
    ///
    /// Fails fast on any missing or inconsistent artifact; the process must
    /// not serve predictions without a complete set.
    pub fn load(config: &Config, device: B::Device) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let artifacts = Artifacts::load(config)?;
        let model_config = ClassifierConfig::from_model_config(&config.model, artifacts.order.len());
        let model = Classifier::load(&device, &config.artifacts.model_path, model_config)?;
        Ok(Self::new(model, artifacts.registry, artifacts.order, device))
    }

    /// Run the classifier on one normalized vector
    ///
    /// Returns the hard class (1 = default) and the class-1 probability in
    /// [0, 1]. The length check is the pipeline's one hard per-request
    /// failure: a mismatch means the feature order disagrees with the
    /// trained model's schema, not that the user sent bad input.
    pub fn predict(&self, vector: &[f32]) -> Result<(u8, f64)> {
        if vector.len() != self.input_dim {
            return Err(MudraError::Prediction(format!(
                "input vector has {} values, model expects {}",
                vector.len(),
                self.input_dim
            )));
        }

        let features =
            Tensor::<B, 1>::from_floats(vector, &self.device).reshape([1, self.input_dim]);
        let proba = self.model.predict_proba(features);

        let values: Vec<f32> = proba
            .into_data()
            .to_vec()
            .map_err(|e| MudraError::Prediction(format!("{:?}", e)))?;
        let probability = values
            .first()
            .copied()
            .map(f64::from)
            .ok_or_else(|| MudraError::Prediction("classifier returned no output".to_string()))?;
        let class = if probability >= 0.5 { 1 } else { 0 };

        Ok((class, probability))
    }

    /// Full pipeline for one request: encode, predict, decode
    ///
    /// Unseen categories and unparseable numerics are substituted and
    /// logged, never surfaced as errors; the only failure mode is the
    /// classifier contract violation from [`Predictor::predict`].
    pub fn predict_loan_default(&self, input: &RawInput) -> Result<LoanPrediction> {
        let (vector, report) = normalize(input, &self.registry, &self.order);
        if !report.is_clean() {
            log::debug!(
                "Normalized with substitutions: {} unseen, {} coerced",
                report.unseen.len(),
                report.coerced.len()
            );
        }

        let (class, probability) = self.predict(&vector)?;
        let decoded_inputs = decode_inputs(input, &self.registry);

        Ok(LoanPrediction {
            label: RiskLabel::from_class(class),
            probability_percent: (probability * 100.0 * 100.0).round() / 100.0,
            decoded_inputs,
        })
    }

    /// Known labels for a categorical feature, in stable code order
    ///
    /// Used by the surrounding UI to populate selectable choices.
    pub fn labels(&self, feature: &str) -> Option<&[String]> {
        self.registry.labels(feature)
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.order
    }

    /// Expected input vector length (N)
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }
}

/// Format a prediction for display
pub fn format_prediction(pred: &LoanPrediction) -> String {
    let mut fields = String::new();
    for (name, value) in &pred.decoded_inputs {
        fields.push_str(&format!("│  {:<28} {}\n", name, value));
    }

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}
│  Default probability: {:.2}%
├─────────────────────────────────────────────────┤
{}└─────────────────────────────────────────────────┘
"#,
        pred.label, pred.probability_percent, fields
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::LabelEncoder;
    use crate::RawValue;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn test_predictor() -> Predictor<TestBackend> {
        let device = Default::default();
        let mut registry = EncoderRegistry::new();
        registry.insert("business", LabelEncoder::new(["Retail", "Services"]));
        let order = FeatureOrder::new(["business", "jobs_created"]);

        let config = ClassifierConfig {
            input_dim: order.len(),
            hidden_dims: vec![8],
            dropout: 0.0,
        };
        let model = Classifier::new(&device, config);

        Predictor::new(model, registry, order, device)
    }

    fn loan_input(business: &str, jobs: &str) -> RawInput {
        let mut input = RawInput::new();
        input.insert("business".to_string(), RawValue::from(business));
        input.insert("jobs_created".to_string(), RawValue::from(jobs));
        input
    }

    #[test]
    fn test_predict_returns_valid_outcome() {
        let predictor = test_predictor();
        let result = predictor
            .predict_loan_default(&loan_input("Retail", "3"))
            .unwrap();

        assert!(matches!(
            result.label,
            RiskLabel::LikelyToDefault | RiskLabel::NotLikelyToDefault
        ));
        assert!(result.probability_percent >= 0.0 && result.probability_percent <= 100.0);
        assert_eq!(result.decoded_inputs["business"], RawValue::from("Retail"));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let predictor = test_predictor();
        let input = loan_input("Services", "7");

        let first = predictor.predict_loan_default(&input).unwrap();
        let second = predictor.predict_loan_default(&input).unwrap();

        assert_eq!(first.label, second.label);
        assert_eq!(first.probability_percent, second.probability_percent);
        assert_eq!(first.decoded_inputs, second.decoded_inputs);
    }

    #[test]
    fn test_unseen_category_still_predicts() {
        let predictor = test_predictor();
        let result = predictor
            .predict_loan_default(&loan_input("Unknown", ""))
            .unwrap();

        // Raw value survives unchanged in the decoded snapshot
        assert_eq!(result.decoded_inputs["business"], RawValue::from("Unknown"));
        assert_eq!(result.decoded_inputs["jobs_created"], RawValue::from(""));
    }

    #[test]
    fn test_dimension_mismatch_is_hard_error() {
        let predictor = test_predictor();
        let err = predictor.predict(&[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, MudraError::Prediction(_)));
    }

    #[test]
    fn test_class_threshold() {
        let predictor = test_predictor();
        let (class, probability) = predictor.predict(&[0.0, 3.0]).unwrap();
        if probability >= 0.5 {
            assert_eq!(class, 1);
        } else {
            assert_eq!(class, 0);
        }
    }

    #[test]
    fn test_labels_choice_list() {
        let predictor = test_predictor();
        assert_eq!(
            predictor.labels("business").unwrap(),
            ["Retail", "Services"]
        );
        assert_eq!(predictor.labels("jobs_created"), None);
    }

    #[test]
    fn test_probability_rounded_to_two_decimals() {
        let predictor = test_predictor();
        let result = predictor
            .predict_loan_default(&loan_input("Retail", "1"))
            .unwrap();
        let scaled = result.probability_percent * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}
