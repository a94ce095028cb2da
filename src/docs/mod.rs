//! # Docs Module
//!
//! Self-documentation records and the parser that produces them from endpoint
//! documentation text.
//!
//! ## Overview
//!
//! Every controller can describe itself: the child controllers it forwards to and the
//! endpoints it serves, grouped by HTTP verb. The router returns this description
//! whenever a request stops at a controller that has no index endpoint for the verb,
//! so any branch of an API can be explored by requesting it directly.
//!
//! ## Documentation text
//!
//! Endpoints attach free text in the familiar doc-block layout:
//!
//! ```text
//! /**
//!  * Fetch a pet.
//!  * Looks the pet up in the store and returns it whole.
//!  * @param int $id The pet id
//!  * @return Pet
//!  */
//! ```
//!
//! - **summary** - text up to the first full stop, blank line or tag
//! - **description** - the remaining text before the first tag
//! - **parameters** - `@param [type] $name [description]`, in source order
//! - **return type** - the first `@return` tag, split on `|`; `self`, `static`,
//!   `Self` and `$this` are all reported as `self`
//!
//! Parameter types declared on the endpoint itself take precedence over the types
//! written in the text.

mod parser;

pub use parser::{parse, parse_cached};

use indexmap::IndexMap;
use serde::Serialize;

/// Type and description of one documented parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterDoc {
    /// Declared type, empty when unknown
    #[serde(rename = "type")]
    pub r#type: String,
    /// Free-text description, empty when absent
    pub description: String,
}

/// Structured documentation for one endpoint.
///
/// All fields are always present; missing information is represented by empty values.
/// A description is only ever set when a summary is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDocumentation {
    pub summary: String,
    pub description: String,
    /// Parameters in declaration order
    pub parameters: IndexMap<String, ParameterDoc>,
    pub return_type: Vec<String>,
}

/// What a controller exposes: discoverable child controllers and endpoints by verb.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    /// Hyphenated child controller segments
    pub controllers: Vec<String>,
    /// Lower-case verb -> hyphenated segment -> documentation
    pub endpoints: IndexMap<String, IndexMap<String, MethodDocumentation>>,
}

impl Documentation {
    /// Documentation for an endpoint, if it is listed.
    #[must_use]
    pub fn endpoint(&self, verb: &str, segment: &str) -> Option<&MethodDocumentation> {
        self.endpoints
            .get(&verb.to_lowercase())
            .and_then(|by_segment| by_segment.get(segment))
    }
}
