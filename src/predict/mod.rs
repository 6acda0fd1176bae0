//! Prediction pipeline
//!
//! Raw input → normalized vector → classifier → decoded result.

pub mod decode;
pub mod inference;
pub mod normalize;

pub use decode::decode_inputs;
pub use inference::{format_prediction, Predictor};
pub use normalize::{normalize, NormalizeReport, UNSEEN_SENTINEL};
