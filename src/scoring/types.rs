use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{HAPAX_KEY, MODIFIED_KEY_SUFFIX};

#[derive(Debug, Clone, Default, PartialEq)]
/// Ordered mapping from metric name to score.
///
/// Insertion order is the feature order handed to the classifier and is preserved through
/// JSON serialization (`{"1":1.0,"2":0.5,...}`).
pub struct ScoreVector {
    entries: Vec<(String, f64)>,
}

impl ScoreVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends `key`, or overwrites its value in place if already present.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Appends every entry of `other` after the existing ones.
    pub fn extend(&mut self, other: ScoreVector) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Scores in insertion order (the classifier's feature vector).
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVectorVisitor;

        impl<'de> Visitor<'de> for ScoreVectorVisitor {
            type Value = ScoreVector;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of metric names to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = ScoreVector::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, f64>()? {
                    scores.insert(key, value);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoreVectorVisitor)
    }
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
#[inline]
pub fn containment_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Baseline keys for lengths `1..=max_n` followed by `"hapax"`.
pub fn baseline_keys(max_n: usize) -> Vec<String> {
    (1..=max_n)
        .map(|n| n.to_string())
        .chain(std::iter::once(HAPAX_KEY.to_string()))
        .collect()
}

/// Modified-scorer keys `"1_mod"..="{max_n}_mod"`.
pub fn modified_keys(max_n: usize) -> Vec<String> {
    (1..=max_n)
        .map(|n| format!("{}{}", n, MODIFIED_KEY_SUFFIX))
        .collect()
}

/// Full feature order of a pair's score vector.
pub fn feature_keys(max_n: usize, use_modified: bool) -> Vec<String> {
    let mut keys = baseline_keys(max_n);
    if use_modified {
        keys.extend(modified_keys(max_n));
    }
    keys
}
