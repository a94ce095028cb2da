//! A small controller tree used by the `helmsman` binary and the benchmarks.
//!
//! ```text
//! /                         documentation of the root
//! GET  /information         "information"
//! GET  /greeting            name, times=1
//! GET  /teapot              418
//! /child                    documentation of the child
//! POST /child/complex-data  param1, param2
//! GET  /child/summary       several named body entries
//! GET  /child/audit         hidden from documentation, still callable
//! ```

use crate::controller::{Controller, Endpoint, Reply};
use crate::error::ApiError;
use crate::status::Status;
use http::Method;
use serde_json::{json, Value};

/// Root of the demonstration tree.
#[must_use]
pub fn root_controller() -> Controller {
    Controller::builder()
        .named("root")
        .endpoint(
            Method::GET,
            "information",
            Endpoint::new(|| -> anyhow::Result<&'static str> { Ok("information") }).doc(
                "/**\n * Returns some information.\n *\n * A fixed string, useful as a liveness probe.\n *\n * @return string\n */",
            ),
        )
        .endpoint(
            Method::GET,
            "greeting",
            Endpoint::new(|name: String, times: i64| -> anyhow::Result<Value> {
                let times = usize::try_from(times)
                    .map_err(|_| ApiError::bad_request("Parameter 'times' must not be negative"))?;
                Ok(json!({ "greeting": vec![format!("Hello, {name}!"); times].join(" ") }))
            })
            .param("name")
            .param_or("times", 1)
            .doc(
                "/**\n * Greets someone.\n *\n * @param string $name Who to greet\n * @param int $times How many\n *   times to repeat it\n * @return array\n */",
            ),
        )
        .endpoint(
            Method::GET,
            "teapot",
            Endpoint::new(|| -> anyhow::Result<Reply> {
                Ok(Reply::new(json!("short and stout")).with_status(Status::new(418)?))
            })
            .doc("/** Refuses to brew coffee. */"),
        )
        .child("child", child_controller)
        .build()
}

/// Second level of the demonstration tree.
#[must_use]
pub fn child_controller() -> Controller {
    Controller::builder()
        .named("child")
        .endpoint(
            Method::POST,
            "complex-data",
            Endpoint::new(|param1: String, param2: i64| -> anyhow::Result<Value> {
                Ok(json!({ "param1": param1, "param2": param2 }))
            })
            .param("param1")
            .param("param2")
            .doc(
                "/**\n * Echoes two parameters.\n *\n * @param string $param1 First value\n * @param int $param2 Second value\n * @return array|self\n */",
            ),
        )
        .endpoint(
            Method::GET,
            "summary",
            Endpoint::new(|| -> anyhow::Result<Reply> {
                Ok(Reply::entries()
                    .entry("name", "child")
                    .entry("endpoints", 3)
                    .entry("", "summary"))
            })
            .doc("/** Describes this controller in several named parts. */"),
        )
        .endpoint(
            Method::GET,
            "audit",
            Endpoint::from_request(|request| -> anyhow::Result<Value> {
                Ok(json!({
                    "request_id": request.id().to_string(),
                    "parameters": request.parameters().to_value(),
                }))
            }),
        )
        .hide("getAuditEndpoint")
        .build()
}
