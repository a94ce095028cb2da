use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Canonical form of a parameter name: lower-case with everything but letters and
/// digits removed, so `X-Api-Key`, `x_api_key` and `xApiKey` all match.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Every request-derived input value under one flat, case- and punctuation-insensitive
/// namespace.
///
/// Sources are merged in order; a later source overrides an earlier one for the same
/// normalised key, and the entry keeps the name it was last written with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: IndexMap<String, (String, Value)>,
}

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        self.entries
            .insert(normalize_key(&key), (key, value.into()))
            .map(|(_, previous)| previous)
    }

    /// Merge a whole source, later pairs overriding earlier ones.
    pub fn extend<I, K, V>(&mut self, source: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in source {
            self.insert(key, value);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&normalize_key(key)).map(|(_, value)| value)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with the names they were supplied under.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// The bag as a JSON object keyed by supplied names.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        Value::Object(map)
    }
}
