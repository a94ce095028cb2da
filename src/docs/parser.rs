use super::{MethodDocumentation, ParameterDoc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;

static PARAM_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@param\s+(?:([^\s$]\S*)\s+)?\$([A-Za-z_][A-Za-z0-9_]*)\s*(.*)$")
        .expect("Failed to compile @param regex")
});

/// Tokens that refer to the documented type itself.
const SELF_TOKENS: &[&str] = &["$this", "static", "self", "Self"];

/// Parse the documentation text attached to an endpoint.
///
/// Accepts `/** ... */` blocks, `///` lines or undecorated text. The result is never
/// absent: blank input gives an all-empty record.
#[must_use]
pub fn parse(text: &str) -> MethodDocumentation {
    let lines = normalize_lines(text);
    let (summary, after_summary) = extract_summary(&lines);
    let description = if summary.is_empty() {
        String::new()
    } else {
        extract_description(&lines[after_summary..])
    };
    let blocks = tag_blocks(&lines);

    MethodDocumentation {
        summary,
        description,
        parameters: extract_parameters(&blocks),
        return_type: extract_return_type(&blocks),
    }
}

/// Parsed records shared by every controller instance, keyed by the source text.
static PARSED: Lazy<RwLock<HashMap<String, MethodDocumentation>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// [`parse`], memoised for the life of the process.
///
/// Controllers are rebuilt for every request while their documentation text never
/// changes, so each distinct text is parsed once. A poisoned cache is bypassed.
#[must_use]
pub fn parse_cached(text: &str) -> MethodDocumentation {
    if let Ok(parsed) = PARSED.read() {
        if let Some(documentation) = parsed.get(text) {
            return documentation.clone();
        }
    }
    let documentation = parse(text);
    if let Ok(mut parsed) = PARSED.write() {
        parsed
            .entry(text.to_string())
            .or_insert_with(|| documentation.clone());
    }
    documentation
}

/// Split into trimmed lines with comment decoration removed. Only a single leading and a
/// single trailing blank line are dropped; interior blanks separate summary and body.
fn normalize_lines(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = text.split('\n').map(strip_decoration).collect();

    if lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn strip_decoration(line: &str) -> String {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    } else if let Some(rest) = line.strip_prefix("/*") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    line = line.trim();
    if let Some(rest) = line.strip_prefix("///").or_else(|| line.strip_prefix("//!")) {
        line = rest;
    } else if let Some(rest) = line.strip_prefix('*') {
        line = rest;
    }
    line.trim().to_string()
}

fn is_tag(line: &str) -> bool {
    line.starts_with('@')
}

/// Returns the summary and the index of the first line after the summary region.
fn extract_summary(lines: &[String]) -> (String, usize) {
    let mut summary: Vec<&str> = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].as_str();
        if is_tag(line) {
            break;
        }
        idx += 1;
        if line.is_empty() {
            if summary.is_empty() {
                continue;
            }
            break;
        }
        summary.push(line);
        if line.ends_with('.') {
            break;
        }
    }

    (summary.join("\n").trim_end().to_string(), idx)
}

fn extract_description(lines: &[String]) -> String {
    lines
        .iter()
        .take_while(|line| !is_tag(line))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Group tag lines with their continuation lines, rejoined with single spaces.
fn tag_blocks(lines: &[String]) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut in_tag = false;

    for line in lines {
        if is_tag(line) {
            blocks.push(line.clone());
            in_tag = true;
        } else if in_tag && !line.is_empty() {
            if let Some(block) = blocks.last_mut() {
                block.push(' ');
                block.push_str(line);
            }
        }
    }
    blocks
}

fn tag_name(block: &str) -> &str {
    block.split_whitespace().next().unwrap_or_default()
}

fn extract_parameters(blocks: &[String]) -> indexmap::IndexMap<String, ParameterDoc> {
    blocks
        .iter()
        .filter(|b| tag_name(b) == "@param")
        .filter_map(|b| PARAM_TAG.captures(b))
        .map(|caps| {
            let doc = ParameterDoc {
                r#type: caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
                description: caps
                    .get(3)
                    .map_or_else(String::new, |m| m.as_str().trim().to_string()),
            };
            (caps[2].to_string(), doc)
        })
        .collect()
}

fn extract_return_type(blocks: &[String]) -> Vec<String> {
    let Some(block) = blocks
        .iter()
        .find(|b| matches!(tag_name(b), "@return" | "@returns"))
    else {
        return Vec::new();
    };

    block
        .split_whitespace()
        .nth(1)
        .map(|types| {
            types
                .split('|')
                .filter(|t| !t.is_empty())
                .map(|t| {
                    if SELF_TOKENS.contains(&t) {
                        "self".to_string()
                    } else {
                        t.to_string()
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "/**
     * Test Summary.
     * Test Description.
     * Description continues.
     *
     * Second description paragraph.
     * @param string $name The name to greet
     * @param int $count How many times
     *        the greeting repeats
     * @param $flag
     * @return string|int|static
     */";

    #[test]
    fn test_cached_parse_is_shared() {
        let text = "/** Cached once. @param int $id The id */";
        let first = parse_cached(text);
        assert_eq!(first, parse(text));
        assert!(PARSED.read().unwrap().contains_key(text));
        assert_eq!(parse_cached(text), first);
    }

    #[test]
    fn test_summary_ends_at_full_stop() {
        let doc = parse(FULL);
        assert_eq!(doc.summary, "Test Summary.");
    }

    #[test]
    fn test_description_runs_until_first_tag() {
        let doc = parse(FULL);
        assert_eq!(
            doc.description,
            "Test Description.\nDescription continues.\n\nSecond description paragraph."
        );
    }

    #[test]
    fn test_summary_ends_at_blank_line() {
        let doc = parse("/**\n * A summary without a stop\n * on two lines\n *\n * Body text\n */");
        assert_eq!(doc.summary, "A summary without a stop\non two lines");
        assert_eq!(doc.description, "Body text");
    }

    #[test]
    fn test_summary_ends_at_tag() {
        let doc = parse("/**\n * Just a summary\n * @return bool\n */");
        assert_eq!(doc.summary, "Just a summary");
        assert_eq!(doc.description, "");
        assert_eq!(doc.return_type, vec!["bool".to_string()]);
    }

    #[test]
    fn test_parameters_keep_order_types_and_multiline_descriptions() {
        let doc = parse(FULL);
        let names: Vec<&String> = doc.parameters.keys().collect();
        assert_eq!(names, vec!["name", "count", "flag"]);

        assert_eq!(doc.parameters["name"].r#type, "string");
        assert_eq!(doc.parameters["name"].description, "The name to greet");
        assert_eq!(
            doc.parameters["count"].description,
            "How many times the greeting repeats"
        );
        assert_eq!(doc.parameters["flag"].r#type, "");
        assert_eq!(doc.parameters["flag"].description, "");
    }

    #[test]
    fn test_return_type_normalises_self_references() {
        let doc = parse(FULL);
        assert_eq!(doc.return_type, vec!["string", "int", "self"]);
        let doc = parse("/** @return $this */");
        assert_eq!(doc.return_type, vec!["self"]);
    }

    #[test]
    fn test_blank_input_gives_empty_record() {
        assert_eq!(parse(""), MethodDocumentation::default());
        assert_eq!(parse("/**\n *\n */"), MethodDocumentation::default());
    }

    #[test]
    fn test_description_requires_summary() {
        let doc = parse("/**\n * @param string $a\n * trailing words\n */");
        assert!(doc.summary.is_empty());
        assert!(doc.description.is_empty());
        assert_eq!(doc.parameters["a"].description, "trailing words");
    }

    #[test]
    fn test_line_endings_are_uniform() {
        let unix = parse("/**\n * Summary.\n * Body.\n * @param int $x Value\n */");
        let windows = parse("/**\r\n * Summary.\r\n * Body.\r\n * @param int $x Value\r\n */");
        let mac = parse("/**\r * Summary.\r * Body.\r * @param int $x Value\r */");
        assert_eq!(unix, windows);
        assert_eq!(unix, mac);
    }

    #[test]
    fn test_rust_line_comments() {
        let doc = parse("/// Fetch a pet.\n///\n/// Looks the pet up by id.\n/// @param int $id Pet id");
        assert_eq!(doc.summary, "Fetch a pet.");
        assert_eq!(doc.description, "Looks the pet up by id.");
        assert_eq!(doc.parameters["id"].r#type, "int");
    }

    #[test]
    fn test_parsing_is_idempotent() {
        assert_eq!(parse(FULL), parse(FULL));
    }
}
