//! # Server Module
//!
//! The I/O boundary around the router: request normalisation on the way in, response
//! encoding on the way out, and the [`ApiService`] orchestrator tying them together.
//!
//! ## Request Flow
//!
//! 1. A transport hands over a [`RawRequest`] (`http::Request<Vec<u8>>` works as is)
//! 2. [`Request`] merges every input source into one [`ParameterBag`] and derives the
//!    path segments and candidate formats
//! 3. The router resolves the segments from a fresh root controller
//! 4. [`Response`] stores the outcome and encodes it with the [`Writer`] picked for
//!    the request's formats
//! 5. Any error on the way becomes an error body with a public-safe message
//!
//! ## Example
//!
//! ```rust
//! use helmsman::controller::{Controller, Endpoint};
//! use helmsman::server::{ApiService, RawRequestParts};
//! use http::Method;
//!
//! let service = ApiService::new(|| {
//!     Controller::builder()
//!         .endpoint(
//!             Method::GET,
//!             "information",
//!             Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("information") }),
//!         )
//!         .build()
//! });
//!
//! let mut out = Vec::new();
//! service
//!     .respond(&RawRequestParts::new(Method::GET, "/information"), &mut out)
//!     .unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("HTTP/1.1 200 OK\r\n"));
//! ```

pub mod parameters;
pub mod readers;
pub mod request;
pub mod response;
pub mod service;
pub mod writers;

pub use parameters::{normalize_key, ParameterBag};
pub use readers::{FormReader, JsonReader, Reader, ReaderFactory};
pub use request::{PathSegments, RawRequest, RawRequestParts, Request};
pub use response::{Response, FALLBACK_BODY};
pub use service::ApiService;
pub use writers::{JsonWriter, TextWriter, Writer, WriterFactory, YamlWriter, KNOWN_FORMATS};
