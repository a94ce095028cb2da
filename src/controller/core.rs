use super::binding::{Binder, Handler, IntoReply, ParamDecl, Reply};
use crate::docs::{self, Documentation, MethodDocumentation, ParameterDoc};
use crate::error::ApiError;
use crate::naming;
use crate::server::Request;
use crate::status::Status;
use http::Method;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

type BoxedHandler = Box<dyn Fn(&Request, &str, &[ParamDecl]) -> anyhow::Result<Reply>>;
type ChildFactory = Box<dyn Fn() -> anyhow::Result<Controller>>;

/// Segment of the endpoint invoked when a request stops at a controller.
pub const INDEX_SEGMENT: &str = "index";

/// A terminal handler together with its declared parameters and documentation text.
pub struct Endpoint {
    handler: BoxedHandler,
    params: Vec<ParamDecl>,
    declared_types: Vec<String>,
    /// Argument count of a bound handler; `None` for whole-request handlers
    arity: Option<usize>,
    doc: Option<String>,
}

impl Endpoint {
    /// Wrap a function whose arguments are bound from the parameter bag.
    ///
    /// Name the arguments, in order, with [`Endpoint::param`] or [`Endpoint::param_or`].
    ///
    /// ```rust
    /// use helmsman::controller::Endpoint;
    /// use serde_json::{json, Value};
    ///
    /// let endpoint = Endpoint::new(|name: String, times: i64| -> anyhow::Result<Value> {
    ///     Ok(json!({ "greeting": name.repeat(times as usize) }))
    /// })
    /// .param("name")
    /// .param_or("times", 1);
    /// ```
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args>,
    {
        let declared_types = handler.parameter_types();
        Self {
            handler: Box::new(
                move |request: &Request, method: &str, params: &[ParamDecl]| {
                    handler.call(&Binder::new(request, method, params))
                },
            ),
            params: Vec::new(),
            arity: Some(declared_types.len()),
            declared_types,
            doc: None,
        }
    }

    /// Wrap a function that reads what it needs from the request itself.
    pub fn from_request<F, R>(handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<R> + 'static,
        R: IntoReply,
    {
        Self {
            handler: Box::new(move |request: &Request, _: &str, _: &[ParamDecl]| {
                handler(request)?.into_reply()
            }),
            params: Vec::new(),
            declared_types: Vec::new(),
            arity: None,
            doc: None,
        }
    }

    /// Declare the next argument, read from the bag entry `name`.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Declare the next argument with a default used when the bag has no entry.
    #[must_use]
    pub fn param_or(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Attach documentation text (see [`crate::docs`] for the layout).
    #[must_use]
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Why the declared parameter names do not line up with the handler's arguments.
    ///
    /// Whole-request handlers take no bound arguments and never mismatch.
    #[must_use]
    pub fn wiring_error(&self) -> Option<String> {
        let arity = self.arity?;
        (arity != self.params.len()).then(|| {
            format!(
                "handler takes {arity} argument(s) but {} parameter name(s) are declared",
                self.params.len()
            )
        })
    }

    /// Parse the documentation text and fold in the declared parameters.
    ///
    /// Declared types win over types written in the text; declared parameters the text
    /// does not mention are listed with an empty description.
    fn documentation(&self) -> MethodDocumentation {
        let mut documentation = self.doc.as_deref().map(docs::parse_cached).unwrap_or_default();

        for (idx, decl) in self.params.iter().enumerate() {
            let declared = self.declared_types.get(idx).cloned().unwrap_or_default();
            let entry = documentation
                .parameters
                .entry(decl.name.clone())
                .or_insert_with(ParameterDoc::default);
            if !declared.is_empty() {
                entry.r#type = declared;
            }
        }
        documentation
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("params", &self.params)
            .field("declared_types", &self.declared_types)
            .field("doc", &self.doc.is_some())
            .finish_non_exhaustive()
    }
}

struct RegisteredEndpoint {
    /// Lower-case verb as registered
    verb: String,
    /// Segment as registered, listed in documentation
    segment: String,
    endpoint: Endpoint,
}

struct RegisteredChild {
    /// Segment as registered, listed in documentation
    segment: String,
    factory: ChildFactory,
}

/// A node in the routing tree.
///
/// Holds endpoints keyed by `(verb, segment)` and child controller factories keyed by
/// segment. Both are stored under their derived method names, so every lookup goes
/// through the naming transforms in [`crate::naming`]. The segment each entry was
/// registered with is kept for the documentation listing.
///
/// Controllers are built per request and owned by the branch of the resolution that
/// created them; nothing here is shared between requests.
pub struct Controller {
    name: String,
    endpoints: IndexMap<String, RegisteredEndpoint>,
    children: IndexMap<String, RegisteredChild>,
    hidden: HashSet<String>,
    status: Option<Status>,
}

impl Controller {
    #[must_use]
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status applied to replies from this controller's endpoints that set none.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Whether an endpoint is registered for `(verb, segment)`.
    ///
    /// Hidden endpoints are still reported; hiding only affects documentation.
    #[must_use]
    pub fn has_endpoint(&self, verb: &Method, segment: &str) -> bool {
        self.endpoints
            .contains_key(&naming::endpoint_method_name(verb.as_str(), segment))
    }

    /// Bind the endpoint's parameters from `request` and invoke it.
    ///
    /// # Errors
    ///
    /// [`ApiError::EndpointNotFound`] if nothing is registered for `(verb, segment)`,
    /// [`ApiError::EndpointInvalid`] if its declared parameters do not match the
    /// handler, binding errors, or whatever the endpoint itself returns, unchanged.
    pub fn invoke_endpoint(
        &self,
        verb: &Method,
        segment: &str,
        request: &Request,
    ) -> anyhow::Result<Reply> {
        let method = naming::endpoint_method_name(verb.as_str(), segment);
        let registered = self
            .endpoints
            .get(&method)
            .ok_or_else(|| ApiError::EndpointNotFound {
                method: method.clone(),
            })?;

        debug!(
            controller = %self.name,
            method = %method,
            params = registered.endpoint.params.len(),
            "Invoking endpoint"
        );

        let endpoint = &registered.endpoint;
        if let Some(reason) = endpoint.wiring_error() {
            return Err(ApiError::EndpointInvalid { method, reason }.into());
        }
        let mut reply = (endpoint.handler)(request, &method, &endpoint.params)?;
        reply.set_status_if_unset(self.status);
        Ok(reply)
    }

    /// Whether a child controller is registered for `segment`.
    #[must_use]
    pub fn has_child_controller(&self, segment: &str) -> bool {
        self.children
            .contains_key(&naming::controller_method_name(segment))
    }

    /// Construct a fresh child controller for `segment`.
    ///
    /// # Errors
    ///
    /// [`ApiError::ChildControllerNotFound`] if nothing is registered,
    /// [`ApiError::ChildControllerInvalid`] if the factory fails.
    pub fn get_child_controller(&self, segment: &str) -> Result<Controller, ApiError> {
        let method = naming::controller_method_name(segment);
        let child = self
            .children
            .get(&method)
            .ok_or_else(|| ApiError::ChildControllerNotFound {
                method: method.clone(),
            })?;

        (child.factory)().map_err(|err| ApiError::ChildControllerInvalid {
            method,
            reason: format!("{err:#}"),
        })
    }

    /// Whether a method name is excluded from documentation.
    #[must_use]
    pub fn is_endpoint_hidden(&self, method_name: &str) -> bool {
        self.hidden.contains(method_name)
    }

    /// Describe the discoverable children and endpoints of this controller.
    #[must_use]
    pub fn documentation(&self) -> Documentation {
        let controllers = self
            .children
            .iter()
            .filter(|(method, _)| !self.is_endpoint_hidden(method))
            .map(|(_, child)| child.segment.clone())
            .collect();

        let mut endpoints: IndexMap<String, IndexMap<String, MethodDocumentation>> =
            IndexMap::new();
        for (method, registered) in &self.endpoints {
            if self.is_endpoint_hidden(method) {
                continue;
            }
            endpoints
                .entry(registered.verb.clone())
                .or_default()
                .insert(
                    registered.segment.clone(),
                    registered.endpoint.documentation(),
                );
        }

        Documentation {
            controllers,
            endpoints,
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("hidden", &self.hidden)
            .field("status", &self.status)
            .finish()
    }
}

/// Collects the registration map for a [`Controller`].
///
/// Registering the same method name twice keeps the later registration.
#[derive(Default)]
pub struct ControllerBuilder {
    name: Option<String>,
    endpoints: IndexMap<String, RegisteredEndpoint>,
    children: IndexMap<String, RegisteredChild>,
    hide: HashSet<String>,
    show: HashSet<String>,
    status: Option<Status>,
}

impl ControllerBuilder {
    /// Name used in logs; defaults to `controller`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register an endpoint for `(verb, segment)`.
    #[must_use]
    pub fn endpoint(mut self, verb: Method, segment: &str, endpoint: Endpoint) -> Self {
        let method = naming::endpoint_method_name(verb.as_str(), segment);
        if let Some(reason) = endpoint.wiring_error() {
            warn!(
                method = %method,
                reason = %reason,
                "Endpoint parameters do not match its handler"
            );
        }
        let registered = RegisteredEndpoint {
            verb: verb.as_str().to_lowercase(),
            segment: segment.to_string(),
            endpoint,
        };
        if self.endpoints.insert(method.clone(), registered).is_some() {
            warn!(method = %method, "Endpoint registered twice, keeping the later one");
        }
        self
    }

    /// Register the index endpoint for `verb`, invoked when a request stops here.
    #[must_use]
    pub fn index(self, verb: Method, endpoint: Endpoint) -> Self {
        self.endpoint(verb, INDEX_SEGMENT, endpoint)
    }

    /// Register a child controller factory for `segment`.
    #[must_use]
    pub fn child<F>(self, segment: &str, factory: F) -> Self
    where
        F: Fn() -> Controller + 'static,
    {
        self.try_child(segment, move || Ok(factory()))
    }

    /// Register a fallible child controller factory for `segment`.
    #[must_use]
    pub fn try_child<F>(mut self, segment: &str, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Controller> + 'static,
    {
        let method = naming::controller_method_name(segment);
        if self
            .children
            .insert(
                method.clone(),
                RegisteredChild {
                    segment: segment.to_string(),
                    factory: Box::new(factory),
                },
            )
            .is_some()
        {
            warn!(method = %method, "Child controller registered twice, keeping the later one");
        }
        self
    }

    /// Exclude a method from documentation.
    #[must_use]
    pub fn hide(mut self, method_name: impl Into<String>) -> Self {
        let method_name = method_name.into();
        self.show.remove(&method_name);
        self.hide.insert(method_name);
        self
    }

    /// Include a method in documentation, including index endpoints.
    #[must_use]
    pub fn show(mut self, method_name: impl Into<String>) -> Self {
        let method_name = method_name.into();
        self.hide.remove(&method_name);
        self.show.insert(method_name);
        self
    }

    /// Status applied to replies that do not set their own.
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Freeze the registration map and the hidden set.
    #[must_use]
    pub fn build(self) -> Controller {
        let mut hidden = self.hide;
        for (method, registered) in &self.endpoints {
            let is_index = *method == naming::endpoint_method_name(&registered.verb, INDEX_SEGMENT);
            if is_index && !self.show.contains(method) {
                hidden.insert(method.clone());
            }
        }

        Controller {
            name: self.name.unwrap_or_else(|| "controller".to_string()),
            endpoints: self.endpoints,
            children: self.children,
            hidden,
            status: self.status,
        }
    }
}
