//! # Status Module
//!
//! Static registry of HTTP status codes and their reason phrases.
//!
//! The table is process-wide, immutable, and safe for unsynchronised concurrent reads.
//! A [`Status`] can only be constructed for a code present in the table; anything else
//! fails with [`ApiError::InvalidStatus`].
//!
//! ## Example
//!
//! ```rust
//! use helmsman::status::Status;
//!
//! let status = Status::new(418).unwrap();
//! assert_eq!(status.http_header(), "HTTP/1.1 418 I'm a teapot");
//! assert!(Status::new(299).is_err());
//! ```

use crate::error::ApiError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Registered status codes, sorted by code.
static STATUS_TABLE: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Entity"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
];

/// Look up the reason phrase for a status code.
///
/// Returns `None` when the code is not registered.
#[must_use]
pub fn lookup(code: u16) -> Option<&'static str> {
    STATUS_TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| STATUS_TABLE[idx].1)
}

/// Format the HTTP/1.1 status line for a code, e.g. `HTTP/1.1 404 Not Found`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidStatus`] if the code is not registered.
pub fn format_header(code: u16) -> Result<String, ApiError> {
    Status::new(code).map(|s| s.http_header())
}

/// A validated HTTP status: a registered code together with its reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    code: u16,
    reason: &'static str,
}

impl Status {
    pub const OK: Status = Status {
        code: 200,
        reason: "OK",
    };
    pub const CREATED: Status = Status {
        code: 201,
        reason: "Created",
    };
    pub const NO_CONTENT: Status = Status {
        code: 204,
        reason: "No Content",
    };
    pub const BAD_REQUEST: Status = Status {
        code: 400,
        reason: "Bad Request",
    };
    pub const NOT_FOUND: Status = Status {
        code: 404,
        reason: "Not Found",
    };
    pub const INTERNAL_SERVER_ERROR: Status = Status {
        code: 500,
        reason: "Internal Server Error",
    };

    /// Construct a status for a registered code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidStatus`] carrying the offending code when it is not
    /// in the registry. Unknown codes are never coerced to a default.
    pub fn new(code: u16) -> Result<Self, ApiError> {
        lookup(code)
            .map(|reason| Status { code, reason })
            .ok_or(ApiError::InvalidStatus { code })
    }

    #[inline]
    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    #[must_use]
    pub fn reason(&self) -> &'static str {
        self.reason
    }

    /// The status line emitted ahead of the response headers.
    #[must_use]
    pub fn http_header(&self) -> String {
        format!("HTTP/1.1 {} {}", self.code, self.reason)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

impl TryFrom<u16> for Status {
    type Error = ApiError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Status::new(code)
    }
}

impl From<Status> for http::StatusCode {
    fn from(status: Status) -> Self {
        // Every registered code lies in 100..=599.
        http::StatusCode::from_u16(status.code).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code)
    }
}
