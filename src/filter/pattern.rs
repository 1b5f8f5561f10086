//! Glob-like namespace patterns
//!
//! `*` matches any run of characters; everything else matches literally.
//! Matching is anchored and case-sensitive.

use regex::Regex;

/// A compiled namespace pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compile `pattern`.
    ///
    /// Callers trim and drop empty tokens before compiling.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_logger_facade::filter::Pattern;
    ///
    /// let pattern = Pattern::compile("app:*");
    /// assert!(pattern.matches("app:db"));
    /// assert!(!pattern.matches("lib:app:db"));
    /// ```
    pub fn compile(pattern: &str) -> Self {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        // Literal segments are escaped; a pattern that still fails to
        // compile (size limit) matches nothing
        let regex = Regex::new(&format!("^{}$", body)).ok();
        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(namespace))
    }

    /// True for the bare `*` pattern, which also matches a missing namespace
    pub fn is_wildcard(&self) -> bool {
        self.source == "*"
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_matches_everything() {
        let pattern = Pattern::compile("*");
        assert!(pattern.is_wildcard());
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything:at:all"));
    }

    #[test]
    fn test_match_is_anchored() {
        let pattern = Pattern::compile("api");
        assert!(pattern.matches("api"));
        assert!(!pattern.matches("api:v1"));
        assert!(!pattern.matches("my-api"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = Pattern::compile("svc.(db)+");
        assert!(pattern.matches("svc.(db)+"));
        assert!(!pattern.matches("svcx(db)+"));
        assert!(!pattern.matches("svc.dbdb"));
    }

    #[test]
    fn test_inner_and_multiple_wildcards() {
        let pattern = Pattern::compile("app:*:query*");
        assert!(pattern.matches("app:db:query"));
        assert!(pattern.matches("app:cache:query-slow"));
        assert!(!pattern.matches("app:db:write"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!Pattern::compile("App").matches("app"));
    }
}
