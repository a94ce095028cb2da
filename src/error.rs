//! # Error Module
//!
//! The error taxonomy shared by the router, controller reflection and the service.
//!
//! Every variant knows the HTTP [`Status`] it maps to and the message that is safe to
//! show a client. The `Display` output is the internal message: it may name methods and
//! parameter types and is meant for logs only.
//!
//! Endpoint code returns `anyhow::Result`. Errors that are not an [`ApiError`] are
//! reported to the client as `500 Internal Server Error` with the bare reason phrase.

use crate::status::Status;
use std::fmt;

/// Errors raised by the routing pipeline or deliberately by endpoint code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A status was requested for a code missing from the registry
    InvalidStatus {
        /// The unregistered code
        code: u16,
    },
    /// No child controller or endpoint matched a path segment
    RouteNotFound {
        /// The unmatched segment
        segment: String,
    },
    /// An endpoint was invoked that the controller does not register
    EndpointNotFound {
        /// Derived method name, e.g. `getInformationEndpoint`
        method: String,
    },
    /// An endpoint's declared parameters do not line up with its handler's arguments
    EndpointInvalid {
        /// Derived method name
        method: String,
        /// What does not line up
        reason: String,
    },
    /// A child controller was requested that the controller does not register
    ChildControllerNotFound {
        /// Derived method name, e.g. `childController`
        method: String,
    },
    /// A child controller factory failed to produce a controller
    ChildControllerInvalid {
        /// Derived method name
        method: String,
        /// What the factory reported
        reason: String,
    },
    /// A declared parameter type rejected the value bound to it
    DeserializationContractViolation {
        /// Parameter name as declared on the endpoint
        parameter: String,
        /// Declared parameter type
        expected: String,
        /// Why the value was rejected
        reason: String,
    },
    /// A required parameter had no value and no default
    MissingParameter {
        /// Parameter name as declared on the endpoint
        parameter: String,
    },
    /// An error raised by endpoint code with an explicit status and client message
    Http {
        /// Status sent to the client
        status: Status,
        /// Message sent to the client
        public_message: String,
        /// Message written to the logs only
        internal_message: Option<String>,
    },
}

impl ApiError {
    /// Build an application error whose message is safe to send to the client.
    pub fn new(status: Status, public_message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            public_message: public_message.into(),
            internal_message: None,
        }
    }

    /// Attach a log-only message to an application error.
    ///
    /// Has no effect on the other variants, whose internal message is derived from
    /// their fields.
    #[must_use]
    pub fn with_internal(mut self, message: impl Into<String>) -> Self {
        if let ApiError::Http {
            internal_message, ..
        } = &mut self
        {
            *internal_message = Some(message.into());
        }
        self
    }

    /// Shorthand for a `400 Bad Request` application error.
    pub fn bad_request(public_message: impl Into<String>) -> Self {
        Self::new(Status::BAD_REQUEST, public_message)
    }

    /// Shorthand for a `404 Not Found` application error.
    pub fn not_found(public_message: impl Into<String>) -> Self {
        Self::new(Status::NOT_FOUND, public_message)
    }

    /// The status the client receives for this error.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            ApiError::RouteNotFound { .. } => Status::NOT_FOUND,
            ApiError::MissingParameter { .. } => Status::BAD_REQUEST,
            ApiError::Http { status, .. } => *status,
            ApiError::InvalidStatus { .. }
            | ApiError::EndpointNotFound { .. }
            | ApiError::EndpointInvalid { .. }
            | ApiError::ChildControllerNotFound { .. }
            | ApiError::ChildControllerInvalid { .. }
            | ApiError::DeserializationContractViolation { .. } => Status::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client receives for this error.
    ///
    /// Internal consistency failures only expose the reason phrase of their status.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            ApiError::RouteNotFound { segment } => {
                format!("Could not find controller or endpoint matching '{segment}'")
            }
            ApiError::MissingParameter { parameter } => {
                format!("Missing required parameter '{parameter}'")
            }
            ApiError::DeserializationContractViolation { parameter, .. } => {
                format!("Parameter '{parameter}' could not be read")
            }
            ApiError::Http { public_message, .. } => public_message.clone(),
            ApiError::InvalidStatus { .. }
            | ApiError::EndpointNotFound { .. }
            | ApiError::EndpointInvalid { .. }
            | ApiError::ChildControllerNotFound { .. }
            | ApiError::ChildControllerInvalid { .. } => self.status().reason().to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidStatus { code } => {
                write!(f, "Status code '{code}' is not a registered HTTP status")
            }
            ApiError::RouteNotFound { segment } => {
                write!(f, "No child controller or endpoint matches segment '{segment}'")
            }
            ApiError::EndpointNotFound { method } => {
                write!(f, "Endpoint method '{method}' is not registered on this controller")
            }
            ApiError::EndpointInvalid { method, reason } => {
                write!(f, "Endpoint method '{method}' is wired incorrectly: {reason}")
            }
            ApiError::ChildControllerNotFound { method } => {
                write!(f, "Controller method '{method}' is not registered on this controller")
            }
            ApiError::ChildControllerInvalid { method, reason } => {
                write!(
                    f,
                    "Controller method '{method}' did not produce a controller: {reason}"
                )
            }
            ApiError::DeserializationContractViolation {
                parameter,
                expected,
                reason,
            } => {
                write!(
                    f,
                    "Parameter '{parameter}' could not be deserialized as '{expected}': {reason}"
                )
            }
            ApiError::MissingParameter { parameter } => {
                write!(f, "Parameter '{parameter}' has no value and no default")
            }
            ApiError::Http {
                status,
                public_message,
                internal_message,
            } => match internal_message {
                Some(internal) => write!(f, "{status}: {internal}"),
                None => write!(f, "{status}: {public_message}"),
            },
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_is_404_and_names_segment() {
        let err = ApiError::RouteNotFound {
            segment: "not-a-real-endpoint".to_string(),
        };
        assert_eq!(err.status(), Status::NOT_FOUND);
        assert!(err.public_message().contains("not-a-real-endpoint"));
    }

    #[test]
    fn test_internal_details_stay_out_of_public_message() {
        let err = ApiError::ChildControllerInvalid {
            method: "secretController".to_string(),
            reason: "database password rejected".to_string(),
        };
        assert_eq!(err.status().code(), 500);
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.to_string().contains("secretController"));
    }

    #[test]
    fn test_application_error_keeps_internal_message_private() {
        let err = ApiError::new(Status::new(409).unwrap(), "Already exists")
            .with_internal("unique constraint users_email_key");
        assert_eq!(err.status().code(), 409);
        assert_eq!(err.public_message(), "Already exists");
        assert!(err.to_string().contains("users_email_key"));
    }
}
