//! Namespace filtering against a debug spec
//!
//! A debug spec is a comma-separated list of glob tokens. Tokens prefixed
//! with `-` disable matching namespaces and always win over positive tokens.
//!
//! ```
//! use rust_logger_facade::filter::is_namespace_enabled;
//!
//! assert!(is_namespace_enabled(Some("app:db"), Some("app:*,-app:cache")));
//! assert!(!is_namespace_enabled(Some("app:cache"), Some("app:*,-app:cache")));
//! assert!(is_namespace_enabled(Some("anything"), None));
//! ```

use super::pattern::Pattern;
use parking_lot::RwLock;
use std::sync::Arc;

/// A parsed debug spec
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    /// `None` when the spec is absent: everything is enabled
    rules: Option<Rules>,
}

#[derive(Debug, Clone)]
struct Rules {
    names: Vec<Pattern>,
    skips: Vec<Pattern>,
}

impl NamespaceFilter {
    pub fn parse(spec: Option<&str>) -> Self {
        let Some(spec) = spec else {
            return Self { rules: None };
        };

        let mut names = Vec::new();
        let mut skips = Vec::new();
        for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.strip_prefix('-') {
                Some(skip) => skips.push(Pattern::compile(skip)),
                None => names.push(Pattern::compile(token)),
            }
        }

        Self {
            rules: Some(Rules { names, skips }),
        }
    }

    /// Filter that enables every namespace
    pub fn allow_all() -> Self {
        Self { rules: None }
    }

    pub fn is_enabled(&self, namespace: Option<&str>) -> bool {
        let Some(rules) = &self.rules else {
            return true;
        };

        match namespace.filter(|ns| !ns.is_empty()) {
            None => {
                rules.names.iter().any(Pattern::is_wildcard)
                    && !rules.skips.iter().any(Pattern::is_wildcard)
            }
            Some(ns) => {
                if rules.skips.iter().any(|p| p.matches(ns)) {
                    return false;
                }
                rules.names.iter().any(|p| p.matches(ns))
            }
        }
    }
}

/// Evaluate `namespace` against `spec` without keeping the parsed form
pub fn is_namespace_enabled(namespace: Option<&str>, spec: Option<&str>) -> bool {
    NamespaceFilter::parse(spec).is_enabled(namespace)
}

#[derive(Debug)]
struct SpecState {
    raw: Option<String>,
    filter: NamespaceFilter,
}

/// Shared, runtime-mutable debug spec.
///
/// Every logger created from the same handle sees a [`DebugSpec::set`]
/// on its next call.
#[derive(Debug, Clone)]
pub struct DebugSpec {
    state: Arc<RwLock<SpecState>>,
}

impl DebugSpec {
    pub fn new(spec: Option<&str>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SpecState {
                raw: spec.map(str::to_string),
                filter: NamespaceFilter::parse(spec),
            })),
        }
    }

    /// Replace the spec; takes effect for the next log call
    pub fn set(&self, spec: Option<&str>) {
        let filter = NamespaceFilter::parse(spec);
        let mut state = self.state.write();
        state.raw = spec.map(str::to_string);
        state.filter = filter;
    }

    pub fn get(&self) -> Option<String> {
        self.state.read().raw.clone()
    }

    pub fn is_enabled(&self, namespace: Option<&str>) -> bool {
        self.state.read().filter.is_enabled(namespace)
    }
}

impl Default for DebugSpec {
    fn default() -> Self {
        Self::new(None)
    }
}
