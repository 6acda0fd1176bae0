//! Categorical feature encoding
//!
//! Bidirectional label/code tables and the fixed feature ordering the
//! trained classifier expects.

pub mod label;
pub mod registry;

pub use label::LabelEncoder;
pub use registry::{EncoderRegistry, FeatureOrder};
