//! Router core module - recursive segment resolution.

use crate::controller::{Controller, Reply, INDEX_SEGMENT};
use crate::docs::Documentation;
use crate::error::ApiError;
use crate::server::Request;
use crate::status::Status;
use tracing::{debug, info, warn};

/// Terminal outcome of resolving a request against a controller tree.
#[derive(Debug)]
pub enum Resolution {
    /// An endpoint was invoked
    Invoked(Reply),
    /// The path stopped at a controller without an index endpoint for the verb
    Documented(Documentation),
}

/// Resolves path segments against a tree of controllers.
///
/// Each step consumes one segment. A segment naming a child controller descends into
/// a freshly built child; a segment naming an endpoint for the request's verb invokes
/// it. Child controllers take precedence over endpoints with the same segment. When
/// no segments remain, the controller's index endpoint is invoked if it has one for
/// the verb, otherwise its documentation is returned.
///
/// The router holds the status reported by the invoked endpoint (or its controller)
/// for the orchestrator to apply to the response.
#[derive(Debug, Default)]
pub struct Router {
    status: Option<Status>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status reported by the last invoked endpoint, if any.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Resolve `segments` starting at `controller`.
    ///
    /// # Arguments
    ///
    /// * `request` - The request parameters are bound from
    /// * `controller` - The controller owning this branch of the resolution
    /// * `segments` - Remaining path segments, consumed left to right
    ///
    /// # Errors
    ///
    /// [`ApiError::RouteNotFound`] when a segment matches neither a child controller
    /// nor an endpoint. Errors from controller factories and endpoints propagate
    /// unchanged.
    pub fn resolve(
        &mut self,
        request: &Request,
        controller: Controller,
        segments: &[String],
    ) -> anyhow::Result<Resolution> {
        let method = request.method();

        let Some((next, rest)) = segments.split_first() else {
            if controller.has_endpoint(method, INDEX_SEGMENT) {
                debug!(
                    controller = %controller.name(),
                    method = %method,
                    "Invoking index endpoint"
                );
                let reply = controller.invoke_endpoint(method, INDEX_SEGMENT, request)?;
                return Ok(self.invoked(reply));
            }

            info!(
                controller = %controller.name(),
                method = %method,
                "No index endpoint, listing controller"
            );
            return Ok(Resolution::Documented(controller.documentation()));
        };

        if controller.has_child_controller(next) {
            debug!(
                controller = %controller.name(),
                segment = %next,
                remaining = rest.len(),
                "Segment resolved to child controller"
            );
            let child = controller.get_child_controller(next)?;
            drop(controller);
            return self.resolve(request, child, rest);
        }

        if controller.has_endpoint(method, next) {
            debug!(
                controller = %controller.name(),
                segment = %next,
                method = %method,
                "Segment resolved to endpoint"
            );
            let reply = controller.invoke_endpoint(method, next, request)?;
            return Ok(self.invoked(reply));
        }

        warn!(
            controller = %controller.name(),
            segment = %next,
            method = %method,
            "No child controller or endpoint matched"
        );
        Err(ApiError::RouteNotFound {
            segment: next.clone(),
        }
        .into())
    }

    fn invoked(&mut self, reply: Reply) -> Resolution {
        if let Some(status) = reply.status() {
            self.status = Some(status);
        }
        Resolution::Invoked(reply)
    }
}
