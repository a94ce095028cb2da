use super::parameters::ParameterBag;
use super::readers::ReaderFactory;
use super::writers::{format_for_accept, KNOWN_FORMATS};
use crate::config::ApiConfig;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use http::Method;
use once_cell::unsync::OnceCell;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, info};

/// Path segments consumed by the router. Most API paths are short enough to stay
/// on the stack.
pub type PathSegments = SmallVec<[String; 8]>;

/// Where a request comes from: anything that can hand over a verb, a URI, headers and
/// a body.
///
/// The transport owns ingestion; by the time a `RawRequest` exists everything has
/// already been read.
pub trait RawRequest {
    fn method(&self) -> Method;

    /// Path plus optional query string, e.g. `/child/complex-data?debug=1`.
    fn uri(&self) -> &str;

    /// Header name/value pairs in arrival order.
    fn headers(&self) -> Vec<(String, String)>;

    fn body_bytes(&self) -> &[u8];

    /// Cookie pairs; by default parsed from the `Cookie` header.
    fn cookies(&self) -> Vec<(String, String)> {
        self.headers()
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("cookie"))
            .flat_map(|(_, value)| parse_cookies(value))
            .collect()
    }

    /// Form fields the transport decoded itself (e.g. multipart); none by default.
    fn form(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Parse a `Cookie` header value into name/value pairs.
#[must_use]
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse the query string of a URI into decoded pairs.
#[must_use]
pub fn parse_query_params(uri: &str) -> Vec<(String, String)> {
    match uri.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

impl RawRequest for http::Request<Vec<u8>> {
    fn method(&self) -> Method {
        http::Request::method(self).clone()
    }

    fn uri(&self) -> &str {
        http::Request::uri(self)
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str)
    }

    fn headers(&self) -> Vec<(String, String)> {
        http::Request::headers(self)
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }

    fn body_bytes(&self) -> &[u8] {
        self.body()
    }
}

/// An in-memory raw request, used by the CLI and by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequestParts {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    form: Vec<(String, String)>,
}

impl RawRequestParts {
    #[must_use]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: Vec::new(),
            form: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and its content type.
    #[must_use]
    pub fn json(self, value: &Value) -> Self {
        self.header("Content-Type", "application/json")
            .body(value.to_string())
    }

    #[must_use]
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }
}

impl RawRequest for RawRequestParts {
    fn method(&self) -> Method {
        self.method.clone()
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    fn form(&self) -> Vec<(String, String)> {
        self.form.clone()
    }
}

/// A normalised request: verb, one flat [`ParameterBag`], the path segments to route
/// and the candidate response formats.
///
/// Read-only once constructed.
#[derive(Debug)]
pub struct Request {
    id: RequestId,
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    parameters: ParameterBag,
    header_format: Option<String>,
    url_format: Option<String>,
    default_format: String,
    chain: OnceCell<PathSegments>,
}

impl Request {
    /// Build a request from a raw source.
    ///
    /// The parameter bag is merged from, in increasing precedence: adjacent URL segment
    /// pairs, cookies, the query string, form fields, headers and the decoded body. A
    /// body no reader accepts is stored whole under the configured text key.
    pub fn new<R>(raw: &R, readers: &ReaderFactory, config: &ApiConfig) -> Self
    where
        R: RawRequest + ?Sized,
    {
        let method = raw.method();
        let uri = raw.uri();
        let raw_path = uri.split('?').next().unwrap_or_default();
        let path = if raw_path.is_empty() {
            "/".to_string()
        } else {
            raw_path.to_string()
        };
        let headers = raw.headers();
        let header = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };

        let id = RequestId::from_header_or_new(header(REQUEST_ID_HEADER));
        let header_format = header("accept")
            .and_then(format_for_accept)
            .map(str::to_string);
        let url_format = url_format(&path);

        let mut parameters = ParameterBag::new();
        let segments = split_path(&path, url_format.is_some());
        parameters.extend(fold_segments(&segments));
        parameters.extend(raw.cookies());
        parameters.extend(parse_query_params(uri));
        parameters.extend(raw.form());
        parameters.extend(headers.iter().cloned());

        let body = String::from_utf8_lossy(raw.body_bytes());
        if !body.trim().is_empty() {
            let content_type = header("content-type");
            match readers.read(&body, content_type) {
                Some(decoded) => parameters.extend(decoded),
                None => {
                    debug!(
                        request_id = %id,
                        content_type = ?content_type,
                        body_size_bytes = body.len(),
                        "No reader accepted body, keeping raw text"
                    );
                    parameters.insert(config.text_key.clone(), body.into_owned());
                }
            }
        }

        info!(
            request_id = %id,
            method = %method,
            path = %path,
            header_format = ?header_format,
            url_format = ?url_format,
            param_count = parameters.len(),
            "Request parsed"
        );

        Self {
            id,
            method,
            path,
            headers,
            parameters,
            header_format,
            url_format,
            default_format: config.default_format.clone(),
            chain: OnceCell::new(),
        }
    }

    /// Build a request with the default readers and configuration.
    #[must_use]
    pub fn from_raw<R>(raw: &R) -> Self
    where
        R: RawRequest + ?Sized,
    {
        Self::new(raw, &ReaderFactory::default(), &ApiConfig::default())
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First header value with this name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    /// Path segments to route, computed on first use.
    ///
    /// Leading and trailing empty segments are dropped and a recognised `.format`
    /// suffix is removed from the last segment. Segments are not percent-decoded.
    pub fn request_chain(&self) -> &PathSegments {
        self.chain
            .get_or_init(|| split_path(&self.path, self.url_format.is_some()))
    }

    /// Candidate response formats in preference order: the `Accept` header, the URL
    /// suffix, then the configured default.
    #[must_use]
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = Vec::with_capacity(3);
        for format in [
            self.header_format.as_deref(),
            self.url_format.as_deref(),
            Some(self.default_format.as_str()),
        ]
        .into_iter()
        .flatten()
        {
            if !formats.iter().any(|f| f == format) {
                formats.push(format.to_string());
            }
        }
        formats
    }
}

/// Format named by a known extension on the last path segment.
fn url_format(path: &str) -> Option<String> {
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let (stem, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!stem.is_empty() && KNOWN_FORMATS.contains(&ext.as_str())).then_some(ext)
}

fn split_path(path: &str, strip_format: bool) -> PathSegments {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return PathSegments::new();
    }
    let mut segments: PathSegments = trimmed.split('/').map(str::to_string).collect();
    if strip_format {
        if let Some(last) = segments.last_mut() {
            if let Some((stem, _)) = last.rsplit_once('.') {
                *last = stem.to_string();
            }
        }
    }
    segments
}

/// Every adjacent pair of segments as a decoded key/value pair.
fn fold_segments(segments: &[String]) -> Vec<(String, String)> {
    segments
        .windows(2)
        .map(|pair| (percent_decode(&pair[0]), percent_decode(&pair[1])))
        .collect()
}

fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain(uri: &str) -> Vec<String> {
        Request::from_raw(&RawRequestParts::new(Method::GET, uri))
            .request_chain()
            .to_vec()
    }

    #[test]
    fn test_request_chain() {
        assert_eq!(chain("/"), Vec::<String>::new());
        assert_eq!(chain(""), Vec::<String>::new());
        assert_eq!(chain("/information"), vec!["information"]);
        assert_eq!(chain("/child/complex-data/"), vec!["child", "complex-data"]);
        assert_eq!(chain("/child/complex-data?x=1"), vec!["child", "complex-data"]);
    }

    #[test]
    fn test_format_suffix_is_stripped() {
        let request = Request::from_raw(&RawRequestParts::new(Method::GET, "/information.yaml"));
        assert_eq!(request.request_chain().to_vec(), vec!["information"]);
        assert_eq!(request.formats(), vec!["yaml", "json"]);

        let unknown = Request::from_raw(&RawRequestParts::new(Method::GET, "/report.pdf"));
        assert_eq!(unknown.request_chain().to_vec(), vec!["report.pdf"]);
        assert_eq!(unknown.formats(), vec!["json"]);
    }

    #[test]
    fn test_formats_order() {
        let raw = RawRequestParts::new(Method::GET, "/information.txt")
            .header("Accept", "application/x-yaml");
        let request = Request::from_raw(&raw);
        assert_eq!(request.formats(), vec!["yaml", "txt", "json"]);
    }

    #[test]
    fn test_url_pairs_fold_into_parameters() {
        let request = Request::from_raw(&RawRequestParts::new(
            Method::GET,
            "/users/42/name/J%C3%BCrgen",
        ));
        let params = request.parameters();
        assert_eq!(params.get("users"), Some(&json!("42")));
        assert_eq!(params.get("42"), Some(&json!("name")));
        assert_eq!(params.get("name"), Some(&json!("Jürgen")));
    }

    #[test]
    fn test_source_precedence() {
        let raw = RawRequestParts::new(Method::POST, "/id/from-url?id=from-query&q=1")
            .header("Cookie", "id=from-cookie; session=abc")
            .header("Id", "from-header")
            .json(&json!({ "id": "from-body" }));
        let params = Request::from_raw(&raw).parameters().clone();
        assert_eq!(params.get("id"), Some(&json!("from-body")));
        assert_eq!(params.get("session"), Some(&json!("abc")));
        assert_eq!(params.get("q"), Some(&json!("1")));
    }

    #[test]
    fn test_header_beats_query() {
        let raw =
            RawRequestParts::new(Method::GET, "/?x_api_key=query").header("X-Api-Key", "header");
        let request = Request::from_raw(&raw);
        assert_eq!(request.parameters().get("xApiKey"), Some(&json!("header")));
    }

    #[test]
    fn test_unreadable_body_kept_as_text() {
        let raw = RawRequestParts::new(Method::POST, "/")
            .header("Content-Type", "text/plain")
            .body("hello there");
        let request = Request::from_raw(&raw);
        assert_eq!(request.parameters().get("text"), Some(&json!("hello there")));
    }

    #[test]
    fn test_form_fields() {
        let raw = RawRequestParts::new(Method::POST, "/?name=query").form_field("name", "form");
        assert_eq!(
            Request::from_raw(&raw).parameters().get("name"),
            Some(&json!("form"))
        );
    }

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::new();
        let raw = RawRequestParts::new(Method::GET, "/").header("X-Request-Id", id.to_string());
        assert_eq!(Request::from_raw(&raw).id(), id);
    }

    #[test]
    fn test_http_request_source() {
        let raw = http::Request::builder()
            .method(Method::PUT)
            .uri("/child/thing?limit=5")
            .header("content-type", "application/json")
            .body(br#"{"value":true}"#.to_vec())
            .unwrap();
        let request = Request::from_raw(&raw);
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.path(), "/child/thing");
        assert_eq!(request.parameters().get("limit"), Some(&json!("5")));
        assert_eq!(request.parameters().get("value"), Some(&json!(true)));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_parse_cookies() {
        assert_eq!(
            parse_cookies("a=b; c=d; =skip; flag"),
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }
}
