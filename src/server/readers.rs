//! Request body decoders.
//!
//! A [`ReaderFactory`] tries its readers in registration order and keeps the first
//! mapping produced. When none succeeds the request stores the raw body under the
//! configured text key instead.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Decodes a request body into named values.
pub trait Reader: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decode `body`, or return `None` if this reader does not understand it.
    fn read(&self, body: &str, content_type: Option<&str>) -> Option<Map<String, Value>>;
}

/// Decodes JSON object bodies, whatever the declared content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl Reader for JsonReader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, body: &str, _content_type: Option<&str>) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Decodes `application/x-www-form-urlencoded` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormReader;

impl Reader for FormReader {
    fn name(&self) -> &'static str {
        "form"
    }

    fn read(&self, body: &str, content_type: Option<&str>) -> Option<Map<String, Value>> {
        let is_form = content_type.is_some_and(|ct| {
            ct.trim()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });
        if !is_form {
            return None;
        }
        Some(
            url::form_urlencoded::parse(body.trim().as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect(),
        )
    }
}

/// Ordered registry of body readers.
#[derive(Clone)]
pub struct ReaderFactory {
    readers: Vec<Arc<dyn Reader>>,
}

impl Default for ReaderFactory {
    fn default() -> Self {
        Self::empty()
            .with_reader(JsonReader)
            .with_reader(FormReader)
    }
}

impl ReaderFactory {
    /// A registry with no readers; every body falls back to raw text.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Append a reader, tried after those already registered.
    #[must_use]
    pub fn with_reader(mut self, reader: impl Reader + 'static) -> Self {
        self.readers.push(Arc::new(reader));
        self
    }

    /// Decode `body` with the first reader that accepts it.
    #[must_use]
    pub fn read(&self, body: &str, content_type: Option<&str>) -> Option<Map<String, Value>> {
        self.readers.iter().find_map(|reader| {
            let decoded = reader.read(body, content_type)?;
            debug!(
                reader = reader.name(),
                fields = decoded.len(),
                "Request body decoded"
            );
            Some(decoded)
        })
    }
}

impl std::fmt::Debug for ReaderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.readers.iter().map(|r| r.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_body() {
        let decoded = ReaderFactory::default()
            .read(r#"{"param1":"x","param2":1}"#, Some("application/json"))
            .unwrap();
        assert_eq!(decoded.get("param1"), Some(&json!("x")));
        assert_eq!(decoded.get("param2"), Some(&json!(1)));
    }

    #[test]
    fn test_json_array_is_not_a_mapping() {
        assert!(JsonReader.read("[1,2]", None).is_none());
    }

    #[test]
    fn test_form_needs_content_type() {
        assert!(FormReader.read("a=1&b=two", None).is_none());
        let decoded = FormReader
            .read("a=1&b=two+words", Some("application/x-www-form-urlencoded; charset=utf-8"))
            .unwrap();
        assert_eq!(decoded.get("b"), Some(&json!("two words")));
    }

    #[test]
    fn test_unreadable_body() {
        assert!(ReaderFactory::default()
            .read("just some text", Some("text/plain"))
            .is_none());
        assert!(ReaderFactory::empty().read("{}", None).is_none());
    }
}
