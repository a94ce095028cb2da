use super::request::Request;
use super::writers::{TextWriter, Writer, WriterFactory};
use crate::config::ApiConfig;
use crate::controller::{Reply, ReplyBody};
use crate::docs::Documentation;
use crate::ids::RequestId;
use crate::router::Resolution;
use crate::status::Status;
use anyhow::Context;
use indexmap::IndexMap;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error};

/// Body sent when even the error response cannot be encoded.
pub const FALLBACK_BODY: &str = "Internal Server Error";

/// The outgoing response: a body of named values, a status and the writer chosen from
/// the request's candidate formats.
///
/// The encoded bytes are produced once by [`Response::prepare`] and reused until the
/// body changes.
pub struct Response {
    body: IndexMap<String, Value>,
    status: Status,
    writer: Arc<dyn Writer>,
    root_name: String,
    data_key: String,
    request_id: RequestId,
    prepared: Option<Vec<u8>>,
}

impl Response {
    #[must_use]
    pub fn new(request: &Request, writers: &WriterFactory, config: &ApiConfig) -> Self {
        Self {
            body: IndexMap::new(),
            status: Status::OK,
            writer: writers.writer_for(&request.formats()),
            root_name: config.root_name.clone(),
            data_key: config.data_key.clone(),
            request_id: request.id(),
            prepared: None,
        }
    }

    #[must_use]
    pub fn body(&self) -> &IndexMap<String, Value> {
        &self.body
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.writer.content_type()
    }

    /// Store a plain value under the data key.
    pub fn set_body_data(&mut self, value: impl Into<Value>) {
        let key = self.data_key.clone();
        self.add_body_entry(key, value);
    }

    /// Store a named value; an empty key means the data key.
    pub fn add_body_entry(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let mut key = key.into();
        if key.is_empty() {
            key.clone_from(&self.data_key);
        }
        self.body.insert(key, value.into());
        self.prepared = None;
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
        self.prepared = None;
    }

    /// Change the status.
    ///
    /// Once a non-200 status is set, setting 200 again is ignored so that a normal
    /// completion cannot mask an earlier outcome.
    pub fn set_status(&mut self, status: Status) {
        if status == Status::OK && self.status != Status::OK {
            debug!(
                request_id = %self.request_id,
                current = self.status.code(),
                "Ignoring reset to 200"
            );
            return;
        }
        self.status = status;
    }

    /// Merge an endpoint's reply into the body.
    pub fn apply_reply(&mut self, reply: Reply) {
        if let Some(status) = reply.status() {
            self.set_status(status);
        }
        match reply.into_body() {
            ReplyBody::Data(value) => self.set_body_data(value),
            ReplyBody::Entries(entries) => {
                for (key, value) in entries {
                    self.add_body_entry(key, value);
                }
            }
        }
    }

    /// Store a controller's documentation as the data value.
    ///
    /// # Errors
    ///
    /// Fails if the documentation cannot be converted to a JSON value.
    pub fn apply_documentation(&mut self, documentation: &Documentation) -> anyhow::Result<()> {
        let value =
            serde_json::to_value(documentation).context("Failed to convert documentation")?;
        self.set_body_data(value);
        Ok(())
    }

    /// Fill the body from the router's terminal outcome.
    ///
    /// # Errors
    ///
    /// Fails if documentation cannot be converted.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> anyhow::Result<()> {
        match resolution {
            Resolution::Invoked(reply) => {
                self.apply_reply(reply);
                Ok(())
            }
            Resolution::Documented(documentation) => self.apply_documentation(&documentation),
        }
    }

    /// Encode the body, once. Later calls return the same bytes until the body changes.
    ///
    /// # Errors
    ///
    /// Returns the writer's error if the body cannot be encoded.
    pub fn prepare(&mut self) -> anyhow::Result<&[u8]> {
        if self.prepared.is_none() {
            let bytes = self.writer.format(&self.body, &self.root_name)?;
            debug!(
                request_id = %self.request_id,
                content_type = self.writer.content_type(),
                size_bytes = bytes.len(),
                "Response prepared"
            );
            self.prepared = Some(bytes);
        }
        Ok(self.prepared.as_deref().unwrap_or_default())
    }

    /// Replace everything with a fixed plain-text 500 that cannot fail to encode.
    pub fn use_fallback(&mut self) {
        error!(request_id = %self.request_id, "Falling back to plain-text error response");
        self.body.clear();
        self.status = Status::INTERNAL_SERVER_ERROR;
        self.writer = Arc::new(TextWriter);
        self.prepared = Some(FALLBACK_BODY.as_bytes().to_vec());
    }

    /// Write the status line, headers and body.
    ///
    /// May be called more than once; the body is encoded only the first time.
    ///
    /// # Errors
    ///
    /// Encoding failures and I/O errors from `out`.
    pub fn respond<W: Write + ?Sized>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let status_line = self.status.http_header();
        let content_type = self.writer.content_type();
        let request_id = self.request_id;
        let bytes = self.prepare()?;
        write!(
            out,
            "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nX-Request-Id: {request_id}\r\n\r\n",
            bytes.len()
        )?;
        out.write_all(bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Convert into an `http::Response` for use with an HTTP server.
    ///
    /// # Errors
    ///
    /// Encoding failures.
    pub fn into_http(mut self) -> anyhow::Result<http::Response<Vec<u8>>> {
        self.prepare()?;
        let bytes = self.prepared.take().unwrap_or_default();
        http::Response::builder()
            .status(http::StatusCode::from(self.status))
            .header(http::header::CONTENT_TYPE, self.writer.content_type())
            .header(crate::ids::REQUEST_ID_HEADER, self.request_id.to_string())
            .body(bytes)
            .context("Failed to build HTTP response")
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("content_type", &self.writer.content_type())
            .field("body", &self.body)
            .field("prepared", &self.prepared.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::RawRequestParts;
    use http::Method;
    use serde_json::json;

    fn response_for(uri: &str) -> Response {
        let request = Request::from_raw(&RawRequestParts::new(Method::GET, uri));
        Response::new(&request, &WriterFactory::default(), &ApiConfig::default())
    }

    #[test]
    fn test_plain_value_goes_under_data_key() {
        let mut response = response_for("/");
        response.apply_reply(Reply::new(json!("information")));
        assert_eq!(response.body().get("data"), Some(&json!("information")));
        assert_eq!(response.prepare().unwrap(), br#"{"data":"information"}"#);
    }

    #[test]
    fn test_entries_merge_in_order() {
        let mut response = response_for("/");
        response.apply_reply(
            Reply::entries()
                .entry("first", 1)
                .entry("", "main")
                .entry("second", 2),
        );
        assert_eq!(
            response.prepare().unwrap(),
            br#"{"first":1,"data":"main","second":2}"#
        );
    }

    #[test]
    fn test_prepare_is_memoized_until_body_changes() {
        let mut response = response_for("/");
        response.set_body_data("a");
        let first = response.prepare().unwrap().to_vec();
        assert_eq!(response.prepare().unwrap(), first.as_slice());
        response.add_body_entry("extra", true);
        assert_ne!(response.prepare().unwrap(), first.as_slice());
    }

    #[test]
    fn test_status_is_not_reset_to_ok() {
        let mut response = response_for("/");
        response.set_status(Status::NOT_FOUND);
        response.set_status(Status::OK);
        assert_eq!(response.status(), Status::NOT_FOUND);
        response.set_status(Status::INTERNAL_SERVER_ERROR);
        assert_eq!(response.status().code(), 500);
    }

    #[test]
    fn test_respond_writes_status_line_and_headers() {
        let mut response = response_for("/information.txt");
        response.set_body_data("information");
        let mut out = Vec::new();
        response.respond(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\n"));
        assert!(text.contains("Content-Length: 27\r\n"));
        assert!(text.ends_with("\r\n\r\nresponse\ndata: information\n"));

        let mut again = Vec::new();
        response.respond(&mut again).unwrap();
        assert_eq!(String::from_utf8(again).unwrap(), text);
    }

    #[test]
    fn test_fallback() {
        let mut response = response_for("/");
        response.set_body_data("x");
        response.use_fallback();
        assert_eq!(response.status().code(), 500);
        assert_eq!(response.prepare().unwrap(), FALLBACK_BODY.as_bytes());
        assert!(response.content_type().starts_with("text/plain"));
    }

    #[test]
    fn test_into_http() {
        let mut response = response_for("/");
        response.set_status(Status::CREATED);
        response.set_body_data(json!({ "id": 1 }));
        let http = response.into_http().unwrap();
        assert_eq!(http.status(), http::StatusCode::CREATED);
        assert_eq!(
            http.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(http.body(), br#"{"data":{"id":1}}"#);
    }
}
