//! # Controller Module
//!
//! Controllers are the nodes of the routing tree. Each one registers endpoints,
//! terminal handlers addressed by an HTTP verb and a path segment, and child
//! controllers, which the router descends into.
//!
//! ## Registration
//!
//! ```rust
//! use helmsman::controller::{Controller, Endpoint};
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
//! let root = Controller::builder()
//!     .named("root")
//!     .endpoint(
//!         Method::GET,
//!         "information",
//!         Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("information") })
//!             .doc("/** Returns some information. */"),
//!     )
//!     .child("child", child)
//!     .build();
//!
//! assert!(root.has_endpoint(&Method::GET, "information"));
//! assert!(root.has_child_controller("child"));
//! ```
//!
//! ## Naming
//!
//! Registrations are stored under derived method names: `GET information` becomes
//! `getInformationEndpoint` and the child `child` becomes `childController`. The
//! documentation listing shows each segment exactly as it was registered, so every
//! listed name routes back to its registration.
//!
//! ## Argument Binding
//!
//! Endpoint arguments are matched by position with the names declared through
//! [`Endpoint::param`] and [`Endpoint::param_or`]. For each one the bag value is used,
//! then the declared default. The argument type converts the value through
//! [`FromRequestValue`]; a rejection is reported as
//! [`ApiError::DeserializationContractViolation`](crate::error::ApiError), a missing
//! value as [`ApiError::MissingParameter`](crate::error::ApiError).
//!
//! ## Hidden Methods
//!
//! Hidden methods are left out of documentation but remain callable when addressed
//! directly. Index endpoints are hidden unless explicitly shown.

mod binding;
mod core;

pub use binding::{
    from_serde, BindError, Binder, Data, FromRequestValue, Handler, IntoReply, ParamDecl, Reply,
    ReplyBody,
};
pub use core::{Controller, ControllerBuilder, Endpoint, INDEX_SEGMENT};
