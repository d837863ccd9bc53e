use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DataPoint, FieldValue};

/// Stable series identity, assigned in first-seen order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(pub usize);

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Field values that distinguish one series from another.
///
/// Equality is map equality: the order keys were extracted in is irrelevant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesKeys(IndexMap<String, FieldValue>);

impl SeriesKeys {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders `field: value, field2: value2` with fields sorted by name.
    #[must_use]
    pub fn label(&self) -> String {
        let mut fields: Vec<(&String, &FieldValue)> = self.0.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
            .into_iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for SeriesKeys {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub keys: SeriesKeys,
}

impl Series {
    #[must_use]
    pub fn label(&self) -> String {
        self.keys.label()
    }
}

/// Assigns incoming points to series based on their non-numeric fields.
///
/// Lookup is a linear scan over known series; series cardinality is expected
/// to stay small compared to point volume.
#[derive(Debug, Clone)]
pub struct SeriesDetector {
    time_field: String,
    key_field: Option<String>,
    fields_to_ignore: IndexSet<String>,
    series: Vec<Series>,
}

impl SeriesDetector {
    /// Creates a detector that never treats `time_field` as a key.
    #[must_use]
    pub fn new(time_field: impl Into<String>) -> Self {
        Self {
            time_field: time_field.into(),
            key_field: None,
            fields_to_ignore: IndexSet::new(),
            series: Vec::new(),
        }
    }

    /// Uses a single field as the whole series identity.
    #[must_use]
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    #[must_use]
    pub fn with_ignored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_ignore
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Extracts the key mapping a point would be grouped by.
    #[must_use]
    pub fn keys_for_point(&self, point: &DataPoint) -> SeriesKeys {
        if let Some(key_field) = &self.key_field {
            let value = point.get(key_field).cloned().unwrap_or(FieldValue::Null);
            return std::iter::once((key_field.clone(), value)).collect();
        }

        point
            .fields()
            .filter(|(name, value)| {
                !value.is_numeric()
                    && *name != self.time_field
                    && !self.fields_to_ignore.contains(*name)
            })
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect()
    }

    /// Returns the series a point belongs to, creating it on first sight.
    pub fn series_for_point(&mut self, point: &DataPoint) -> &Series {
        let keys = self.keys_for_point(point);
        let index = match self.series.iter().position(|series| series.keys == keys) {
            Some(index) => index,
            None => {
                let id = SeriesId(self.series.len());
                debug!(series = %id, label = %keys.label(), "new series detected");
                self.series.push(Series { id, keys });
                self.series.len() - 1
            }
        };
        &self.series[index]
    }

    #[must_use]
    pub fn series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(id.0)
    }

    #[must_use]
    pub fn series_label(&self, id: SeriesId) -> Option<String> {
        self.series(id).map(Series::label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_sorts_fields_regardless_of_extraction_order() {
        let keys: SeriesKeys = [
            ("zone", FieldValue::from("eu")),
            ("host", FieldValue::from("a")),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.label(), "host: a, zone: eu");
    }

    #[test]
    fn key_field_missing_collapses_to_null() {
        let detector = SeriesDetector::new("time").with_key_field("host");
        let keys = detector.keys_for_point(&DataPoint::new().with("time", 1.0));
        assert_eq!(keys.get("host"), Some(&FieldValue::Null));
    }
}
