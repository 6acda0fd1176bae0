//! Classifier architecture
//!
//! A small MLP with a single logit head, standing in for the pre-trained
//! binary default-risk classifier. Weights are loaded from a recorder file
//! at startup; this crate never trains.

pub mod classifier;

pub use classifier::{Classifier, ClassifierConfig};
