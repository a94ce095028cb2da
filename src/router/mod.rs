//! # Router Module
//!
//! The router walks a request path segment by segment through a tree of
//! [`Controller`](crate::controller::Controller)s.
//!
//! ## Overview
//!
//! There is no route table. Each controller answers two questions for a segment:
//! does a child controller exist for it, and does an endpoint exist for it under the
//! request's verb. The router asks them in that order and either descends into the
//! child or invokes the endpoint.
//!
//! ```text
//! GET /child/complex-data
//!
//! Resolving([child, complex-data], root)
//!   root.childController?            yes -> Resolving([complex-data], child)
//!     child.complexDataController?   no
//!     child.getComplexDataEndpoint?  yes -> Invoked(reply)
//! ```
//!
//! ## Terminal States
//!
//! - **Invoked** - an endpoint ran and produced a reply
//! - **Documented** - the path ended at a controller without an index endpoint for the
//!   verb, so the controller's documentation is returned
//! - **Failed** - a segment matched nothing (`RouteNotFound`, 404) or an endpoint or
//!   factory failed; endpoint errors are never caught here
//!
//! ## Example
//!
//! ```rust
//! use helmsman::controller::{Controller, Endpoint};
//! use helmsman::router::{Resolution, Router};
//! use helmsman::server::{RawRequestParts, Request};
//! use http::Method;
//!
//! let root = Controller::builder()
//!     .endpoint(
//!         Method::GET,
//!         "information",
//!         Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("information") }),
//!     )
//!     .build();
//!
//! let request = Request::from_raw(&RawRequestParts::new(Method::GET, "/information"));
//! let mut router = Router::new();
//! let resolution = router.resolve(&request, root, request.request_chain()).unwrap();
//! assert!(matches!(resolution, Resolution::Invoked(_)));
//! ```
//!
//! ## Ownership
//!
//! A child controller is built for the branch that reaches it and dropped when that
//! branch finishes. Nothing is cached between requests, so there is no shared mutable
//! state and no locking.

mod core;
#[cfg(test)]
mod tests;

pub use core::{Resolution, Router};
