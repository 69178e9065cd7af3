//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile a route-table key like `/users/:id` into typed segments
//! - Match a concrete request path against a compiled pattern
//! - Extract named parameter values, percent-decoded
//!
//! # Design Decisions
//! - Plain segment comparison, no regex: literals are byte-exact, so
//!   characters that would be regex-significant need no escaping
//! - A match requires equal segment counts; no wildcards, no optional
//!   segments, no catch-all
//! - A parameter segment matches any single non-empty, slash-free segment
//! - If the same parameter name appears twice in one pattern, the last
//!   occurrence wins (kept quirk)

use std::collections::HashMap;

/// One `/`-delimited unit of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matched byte-for-byte against the path segment.
    Literal(String),
    /// Matches any non-empty slash-free segment; carries the parameter name.
    Param(String),
}

/// A route pattern compiled into its segments.
///
/// Compilation never fails: a segment starting with `:` is a parameter
/// named by the remainder, everything else is a literal.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Compiles a route-table key into a matcher.
    pub fn compile(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// The pattern text this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Names of the parameters in this pattern, in segment order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a concrete path, returning extracted parameters on success.
    ///
    /// Splitting keeps empty segments, so `/about/` has one segment more
    /// than `/about` and the two never match each other.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = path.split('/').collect();

        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, candidate) in self.segments.iter().zip(&path_segments) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != candidate {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if candidate.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode_segment(candidate));
                }
            }
        }

        Some(params)
    }
}

/// Percent-decodes an extracted path segment.
///
/// Invalid escape sequences fall back to the raw segment text, consistent
/// with the lenient parsing policy elsewhere in the request pipeline.
fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_exactly() {
        let pattern = CompiledPattern::compile("/users/active");
        assert!(pattern.match_path("/users/active").is_some());
        assert!(pattern.match_path("/users/other").is_none());
        assert!(pattern.match_path("/users").is_none());
        assert!(pattern.match_path("/users/active/extra").is_none());
    }

    #[test]
    fn trailing_slash_changes_segment_count() {
        let pattern = CompiledPattern::compile("/about");
        assert!(pattern.match_path("/about").is_some());
        assert!(pattern.match_path("/about/").is_none());
    }

    #[test]
    fn root_pattern_matches_root_path() {
        let pattern = CompiledPattern::compile("/");
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("/anything").is_none());
    }

    #[test]
    fn param_segment_extracts_value() {
        let pattern = CompiledPattern::compile("/users/:id");
        let params = pattern.match_path("/users/123").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("123"));
    }

    #[test]
    fn param_segment_rejects_empty_value() {
        let pattern = CompiledPattern::compile("/users/:id");
        assert!(pattern.match_path("/users/").is_none());
    }

    #[test]
    fn param_never_spans_slashes() {
        let pattern = CompiledPattern::compile("/users/:id");
        assert!(pattern.match_path("/users/1/posts").is_none());
    }

    #[test]
    fn multiple_params_extract_in_order() {
        let pattern = CompiledPattern::compile("/a/:x/b/:y");
        let params = pattern.match_path("/a/1/b/2").unwrap();
        assert_eq!(params.get("x").map(String::as_str), Some("1"));
        assert_eq!(params.get("y").map(String::as_str), Some("2"));
    }

    #[test]
    fn duplicate_param_name_keeps_last_occurrence() {
        let pattern = CompiledPattern::compile("/pair/:id/:id");
        let params = pattern.match_path("/pair/first/second").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("second"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn literal_with_regex_significant_characters() {
        let pattern = CompiledPattern::compile("/files/v1.2/data+set");
        assert!(pattern.match_path("/files/v1.2/data+set").is_some());
        // '.' is not a wildcard here
        assert!(pattern.match_path("/files/v1x2/data+set").is_none());
    }

    #[test]
    fn extracted_values_are_percent_decoded() {
        let pattern = CompiledPattern::compile("/users/:name");
        let params = pattern.match_path("/users/jane%20doe").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("jane doe"));
    }

    #[test]
    fn invalid_percent_escape_falls_back_to_raw() {
        let pattern = CompiledPattern::compile("/users/:name");
        let params = pattern.match_path("/users/bad%zzescape").unwrap();
        assert_eq!(
            params.get("name").map(String::as_str),
            Some("bad%zzescape")
        );
    }

    #[test]
    fn param_names_follow_segment_order() {
        let pattern = CompiledPattern::compile("/a/:x/:y");
        let names: Vec<&str> = pattern.param_names().collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
