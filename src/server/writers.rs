//! Response body encoders and their selection by format name.

use anyhow::Context;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Format names the default [`WriterFactory`] understands. A request path ending in
/// `.<format>` for one of these names asks for that format.
pub const KNOWN_FORMATS: &[&str] = &["json", "yaml", "yml", "text", "txt"];

/// Map a media type (as found in `Accept`) to a format name.
#[must_use]
pub fn format_for_media_type(media_type: &str) -> Option<&'static str> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "application/json" | "text/json" => Some("json"),
        "application/x-yaml" | "application/yaml" | "text/yaml" | "text/x-yaml" => Some("yaml"),
        "text/plain" => Some("text"),
        _ => None,
    }
}

/// Format named by an `Accept` header: the first listed media type that maps to one.
#[must_use]
pub fn format_for_accept(accept: &str) -> Option<&'static str> {
    accept.split(',').find_map(format_for_media_type)
}

/// Serializes a response body.
pub trait Writer: Send + Sync {
    fn content_type(&self) -> &'static str;

    /// Encode `body`. `root_name` names the top-level element for formats that have one.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in this format.
    fn format(&self, body: &IndexMap<String, Value>, root_name: &str) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn format(&self, body: &IndexMap<String, Value>, _root_name: &str) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec(body).context("Failed to encode response body as JSON")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlWriter;

impl Writer for YamlWriter {
    fn content_type(&self) -> &'static str {
        "application/x-yaml"
    }

    fn format(&self, body: &IndexMap<String, Value>, _root_name: &str) -> anyhow::Result<Vec<u8>> {
        serde_yaml::to_string(body)
            .map(String::into_bytes)
            .context("Failed to encode response body as YAML")
    }
}

/// Line-oriented plain text: the root name, then one `key: value` line per entry.
/// Strings are written bare, everything else as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

impl Writer for TextWriter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn format(&self, body: &IndexMap<String, Value>, root_name: &str) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        writeln!(out, "{root_name}")?;
        for (key, value) in body {
            match value {
                Value::String(s) => writeln!(out, "{key}: {s}")?,
                other => writeln!(out, "{key}: {other}")?,
            }
        }
        Ok(out.into_bytes())
    }
}

/// Picks a [`Writer`] from a request's candidate formats.
#[derive(Clone)]
pub struct WriterFactory {
    writers: IndexMap<String, Arc<dyn Writer>>,
}

impl Default for WriterFactory {
    fn default() -> Self {
        let json: Arc<dyn Writer> = Arc::new(JsonWriter);
        let yaml: Arc<dyn Writer> = Arc::new(YamlWriter);
        let text: Arc<dyn Writer> = Arc::new(TextWriter);
        let mut writers = IndexMap::new();
        writers.insert("json".to_string(), Arc::clone(&json));
        writers.insert("yaml".to_string(), Arc::clone(&yaml));
        writers.insert("yml".to_string(), yaml);
        writers.insert("text".to_string(), Arc::clone(&text));
        writers.insert("txt".to_string(), text);
        Self { writers }
    }
}

impl WriterFactory {
    /// Register (or replace) the writer for a format name.
    #[must_use]
    pub fn with_writer(mut self, format: &str, writer: impl Writer + 'static) -> Self {
        self.writers
            .insert(format.to_ascii_lowercase(), Arc::new(writer));
        self
    }

    #[must_use]
    pub fn supports(&self, format: &str) -> bool {
        self.writers.contains_key(&format.to_ascii_lowercase())
    }

    /// The writer for the first candidate format that has one, JSON otherwise.
    #[must_use]
    pub fn writer_for(&self, formats: &[String]) -> Arc<dyn Writer> {
        let chosen = formats.iter().find_map(|format| {
            self.writers
                .get(&format.to_ascii_lowercase())
                .map(|writer| (format.as_str(), writer))
        });
        match chosen {
            Some((format, writer)) => {
                debug!(format = %format, candidates = ?formats, "Writer selected");
                Arc::clone(writer)
            }
            None => {
                debug!(candidates = ?formats, "No writer for candidates, using JSON");
                self.writers
                    .get("json")
                    .map_or_else(|| Arc::new(JsonWriter) as Arc<dyn Writer>, Arc::clone)
            }
        }
    }
}

impl std::fmt::Debug for WriterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.writers.keys()).finish()
    }
}
