//! # Naming Module
//!
//! The fixed transforms between URL path segments and the method names controllers
//! register under. These must be bit-reproducible: registration and the reflection
//! queries the router makes both depend on them agreeing.
//!
//! | Segment | Verb | Method name |
//! |---|---|---|
//! | `complex-data` | `POST` | `postComplexDataEndpoint` |
//! | `child` | - | `childController` |
//! | `user+profile` | `GET` | `getUserProfileEndpoint` |
//!
//! Words are split on `-`, `+` and a literal `%20`. Each word has its first character
//! upper-cased and the rest left untouched.

use once_cell::sync::Lazy;
use regex::Regex;

const ENDPOINT_SUFFIX: &str = "Endpoint";
const CONTROLLER_SUFFIX: &str = "Controller";

static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("Failed to compile hyphenation regex"));

static ENDPOINT_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)([A-Z][A-Za-z0-9]*)Endpoint$")
        .expect("Failed to compile endpoint method regex")
});

static CONTROLLER_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][A-Za-z0-9]*)Controller$")
        .expect("Failed to compile controller method regex")
});

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a path segment into PascalCase words with the separators removed.
///
/// `complex-data` becomes `ComplexData`.
#[must_use]
pub fn unhyphenate(segment: &str) -> String {
    segment
        .replace("%20", " ")
        .replace(['-', '+'], " ")
        .split(' ')
        .map(upper_first)
        .collect()
}

/// Insert a hyphen wherever a lower-case letter is followed by an upper-case one,
/// then lower-case the whole string.
///
/// `ComplexData` becomes `complex-data`.
#[must_use]
pub fn hyphenate(name: &str) -> String {
    LOWER_UPPER.replace_all(name, "$1-$2").to_lowercase()
}

/// The method name an endpoint for `(verb, segment)` registers under.
#[must_use]
pub fn endpoint_method_name(verb: &str, segment: &str) -> String {
    format!(
        "{}{}{ENDPOINT_SUFFIX}",
        verb.to_lowercase(),
        unhyphenate(segment)
    )
}

/// The method name a child controller for `segment` registers under.
#[must_use]
pub fn controller_method_name(segment: &str) -> String {
    format!("{}{CONTROLLER_SUFFIX}", lower_first(&unhyphenate(segment)))
}

/// Split an endpoint method name back into its lower-case verb and hyphenated segment.
///
/// Returns `None` for names that do not follow the endpoint convention.
#[must_use]
pub fn parse_endpoint_method(name: &str) -> Option<(String, String)> {
    let caps = ENDPOINT_METHOD.captures(name)?;
    Some((caps[1].to_string(), hyphenate(&caps[2])))
}

/// Recover the hyphenated segment from a controller method name.
#[must_use]
pub fn parse_controller_method(name: &str) -> Option<String> {
    let caps = CONTROLLER_METHOD.captures(name)?;
    Some(hyphenate(&caps[1]))
}
