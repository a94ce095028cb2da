//! # helmsman
//!
//! **helmsman** is a convention-driven API router. A request path is walked segment by
//! segment through a tree of controllers; each segment either descends into a child
//! controller or invokes an endpoint registered for the request's verb. Any branch that
//! has no index endpoint describes itself, so the API documents itself at every level.
//!
//! ## Overview
//!
//! There is no route table. Controllers register endpoints under `(verb, segment)` and
//! child controller factories under `segment`, stored by derived method names such as
//! `getInformationEndpoint` and `childController`. Endpoint arguments are bound by name
//! from a single parameter bag that merges the URL, cookies, query string, form fields,
//! headers and the decoded body.
//!
//! ## Architecture
//!
//! - **[`status`]** - Static registry of HTTP status codes and reason phrases
//! - **[`naming`]** - Segment to method-name transforms and their inverse
//! - **[`docs`]** - Documentation comment parser and documentation records
//! - **[`controller`]** - Controllers, endpoints, argument binding and replies
//! - **[`router`]** - Recursive segment resolution
//! - **[`server`]** - Request and response models, readers, writers and the
//!   [`ApiService`] orchestrator
//! - **[`error`]** - The error taxonomy and its mapping to statuses and public messages
//! - **[`config`]**, **[`logging`]** - Runtime configuration and structured logging
//! - **[`cli`]**, **[`demo`]** - The `helmsman` binary and its demonstration tree
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as Transport
//!     participant S as ApiService
//!     participant Q as Request
//!     participant R as Router
//!     participant C as Controller
//!     participant P as Response
//!
//!     T->>S: handle(raw)
//!     S->>Q: Request::new(raw, readers, config)
//!     Q-->>S: parameters, request chain, formats
//!     S->>R: resolve(request, root(), chain)
//!     loop one segment per step
//!         R->>C: has_child_controller(segment)?
//!         C-->>R: child controller, recurse
//!         R->>C: has_endpoint(verb, segment)?
//!         C-->>R: invoke_endpoint -> Reply
//!     end
//!     R-->>S: Invoked(reply) or Documented(docs)
//!     S->>P: apply_resolution, prepare()
//!     P-->>T: status line, Content-Type, bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use helmsman::controller::{Controller, Endpoint};
//! use helmsman::server::RawRequestParts;
//! use helmsman::ApiService;
//! use http::Method;
//! use serde_json::{json, Value};
//!
//! fn child() -> Controller {
//!     Controller::builder()
//!         .named("child")
//!         .endpoint(
//!             Method::POST,
//!             "complex-data",
//!             Endpoint::new(|param1: String, param2: i64| -> anyhow::Result<Value> {
//!                 Ok(json!({ "param1": param1, "param2": param2 }))
//!             })
//!             .param("param1")
//!             .param("param2"),
//!         )
//!         .build()
//! }
//!
//! let service = ApiService::new(|| Controller::builder().child("child", child).build());
//!
//! let raw = RawRequestParts::new(Method::POST, "/child/complex-data")
//!     .json(&json!({ "param1": "x", "param2": 1 }));
//! let mut response = service.handle(&raw);
//!
//! assert_eq!(response.status().code(), 200);
//! assert_eq!(
//!     response.prepare().unwrap(),
//!     br#"{"data":{"param1":"x","param2":1}}"#
//! );
//! ```
//!
//! ## Error Handling
//!
//! Endpoints return `anyhow::Result`. Errors travel through the router untouched and
//! are converted once, by [`ApiService`]: an [`ApiError`] supplies its own status and
//! public message, anything else becomes a 500 with the reason phrase. The internal
//! message is logged with the request id and never sent to the client.
//!
//! ## Concurrency
//!
//! Each request is processed synchronously on the caller's thread. Controllers are
//! built per request and never shared, so the only process-wide state is the
//! read-only status table. [`ApiService`] is `Send + Sync` and cheap to clone, so a
//! threaded server can share one instance between workers.

pub mod cli;
pub mod config;
pub mod controller;
pub mod demo;
pub mod docs;
pub mod error;
pub mod ids;
pub mod logging;
pub mod naming;
pub mod router;
pub mod server;
pub mod status;

pub use config::ApiConfig;
pub use controller::{Controller, Endpoint, Reply};
pub use error::ApiError;
pub use router::{Resolution, Router};
pub use server::{ApiService, RawRequest, RawRequestParts, Request, Response};
pub use status::Status;
