//! Bidirectional label/code table for one categorical feature

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maps a finite set of string labels to integer codes 0..k-1
///
/// Codes follow the order labels were supplied in, so an encoder built from
/// the same class list as the training run reproduces the training codes.
/// Immutable after construction; shared read-only across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl LabelEncoder {
    /// Build an encoder from an ordered class list (duplicates keep their
    /// first position)
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for class in classes {
            let class = class.into();
            if !index.contains_key(&class) {
                index.insert(class.clone(), ordered.len() as i64);
                ordered.push(class);
            }
        }
        LabelEncoder {
            classes: ordered,
            index,
        }
    }

    /// Code for a known label, or None if the label is unseen
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.index.get(label).copied()
    }

    /// Label for a known code, or None if the code is out of range
    pub fn decode(&self, code: i64) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Known labels in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl From<Vec<String>> for LabelEncoder {
    fn from(classes: Vec<String>) -> Self {
        LabelEncoder::new(classes)
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}
