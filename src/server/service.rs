use super::readers::{Reader, ReaderFactory};
use super::request::{RawRequest, Request};
use super::response::Response;
use super::writers::{Writer, WriterFactory};
use crate::config::ApiConfig;
use crate::controller::Controller;
use crate::error::ApiError;
use crate::router::Router;
use crate::status::Status;
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};

type RootFactory = Arc<dyn Fn() -> Controller + Send + Sync>;

/// Runs one request through the whole pipeline: request normalisation, resolution
/// from a fresh root controller, response encoding and error conversion.
///
/// Every error raised anywhere below is caught here. The client receives a body of
/// `{code, message}` under the data key with a public-safe message; the internal
/// message, including any cause chain, only reaches the logs.
#[derive(Clone)]
pub struct ApiService {
    root: RootFactory,
    config: ApiConfig,
    readers: ReaderFactory,
    writers: WriterFactory,
}

impl ApiService {
    /// Create a service whose root controller is built by `root` for every request.
    pub fn new<F>(root: F) -> Self
    where
        F: Fn() -> Controller + Send + Sync + 'static,
    {
        Self {
            root: Arc::new(root),
            config: ApiConfig::default(),
            readers: ReaderFactory::default(),
            writers: WriterFactory::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a body reader, tried after the default ones.
    #[must_use]
    pub fn with_reader(mut self, reader: impl Reader + 'static) -> Self {
        self.readers = self.readers.with_reader(reader);
        self
    }

    /// Register (or replace) the writer for a format name.
    #[must_use]
    pub fn with_writer(mut self, format: &str, writer: impl Writer + 'static) -> Self {
        self.writers = self.writers.with_writer(format, writer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Handle one request and return the prepared response.
    ///
    /// Never fails: errors become error responses, and an error response that cannot
    /// be encoded becomes the plain-text fallback.
    pub fn handle<R>(&self, raw: &R) -> Response
    where
        R: RawRequest + ?Sized,
    {
        let request = Request::new(raw, &self.readers, &self.config);
        let mut response = Response::new(&request, &self.writers, &self.config);

        match self.run(&request, &mut response) {
            Ok(()) => {
                info!(
                    request_id = %request.id(),
                    method = %request.method(),
                    path = %request.path(),
                    status = response.status().code(),
                    "Request handled"
                );
            }
            Err(err) => Self::fail(&request, &mut response, &err),
        }
        response
    }

    /// Handle one request and write the raw HTTP response to `out`.
    ///
    /// # Errors
    ///
    /// Only I/O errors from `out`.
    pub fn respond<R, W>(&self, raw: &R, out: &mut W) -> anyhow::Result<()>
    where
        R: RawRequest + ?Sized,
        W: io::Write + ?Sized,
    {
        self.handle(raw).respond(out)
    }

    fn run(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        let mut router = Router::new();
        let resolution = router.resolve(request, (self.root)(), request.request_chain())?;
        response.apply_resolution(resolution)?;
        if let Some(status) = router.status() {
            response.set_status(status);
        }
        // Encode now so a writer failure is still reported as an error response
        response.prepare()?;
        Ok(())
    }

    fn fail(request: &Request, response: &mut Response, err: &anyhow::Error) {
        let (status, public_message) = match err.downcast_ref::<ApiError>() {
            Some(api_error) => (api_error.status(), api_error.public_message()),
            None => (
                Status::INTERNAL_SERVER_ERROR,
                Status::INTERNAL_SERVER_ERROR.reason().to_string(),
            ),
        };

        if status.code() >= 500 {
            error!(
                request_id = %request.id(),
                method = %request.method(),
                path = %request.path(),
                status = status.code(),
                error = %format!("{err:#}"),
                "Request failed"
            );
        } else {
            warn!(
                request_id = %request.id(),
                method = %request.method(),
                path = %request.path(),
                status = status.code(),
                error = %format!("{err:#}"),
                "Request rejected"
            );
        }

        response.clear_body();
        response.set_status(status);
        response.set_body_data(json!({
            "code": status.code(),
            "message": public_message,
        }));
        let prepared = response.prepare().map(|_| ());
        if let Err(prepare_err) = prepared {
            error!(
                request_id = %request.id(),
                error = %format!("{prepare_err:#}"),
                "Failed to encode error response"
            );
            response.use_fallback();
        }
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("config", &self.config)
            .field("readers", &self.readers)
            .field("writers", &self.writers)
            .finish_non_exhaustive()
    }
}
