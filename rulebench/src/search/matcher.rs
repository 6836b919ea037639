use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::errors::{BenchError, BenchResult};

/// An immutable compiled regular expression shared read-only between threads.
///
/// Cloning is a reference-count bump; clones point at the same compiled automaton.
#[derive(Clone)]
pub struct CompiledPattern(Arc<Regex>);

impl CompiledPattern {
    /// Compiles a new automaton; every call yields an independent pattern
    pub fn compile(source: &str) -> BenchResult<Self> {
        trace!("Compiling pattern: {}", source);
        let regex = Regex::new(source).map_err(|e| BenchError::invalid_pattern(e.to_string()))?;
        Ok(Self(Arc::new(regex)))
    }

    /// The source text this pattern was compiled from
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether two handles refer to the same compiled automaton
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledPattern").field(&self.as_str()).finish()
    }
}

/// Reports whether `pattern` occurs anywhere in `text`.
///
/// This is a find probe, not a full-string match: `^456` matches `"456789"`.
pub fn matches(pattern: &CompiledPattern, text: &str) -> bool {
    pattern.0.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern_matching() {
        let hit = CompiledPattern::compile("^456.*").unwrap();
        let miss = CompiledPattern::compile("^123.*").unwrap();
        assert!(matches(&hit, "456789"));
        assert!(!matches(&miss, "456789"));
    }

    #[test]
    fn test_find_semantics_not_full_match() {
        let pattern = CompiledPattern::compile("67").unwrap();
        assert!(matches(&pattern, "456789"));

        let anchored = CompiledPattern::compile("^56").unwrap();
        assert!(!matches(&anchored, "456789"));
    }

    #[test]
    fn test_compile_yields_independent_patterns() {
        let first = CompiledPattern::compile("^123.*").unwrap();
        let second = CompiledPattern::compile("^123.*").unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(first.ptr_eq(&first.clone()));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = CompiledPattern::compile("^(123");
        assert!(matches!(result, Err(BenchError::InvalidPattern(_))));
    }

    #[test]
    fn test_debug_shows_source() {
        let pattern = CompiledPattern::compile("^123.*").unwrap();
        assert_eq!(format!("{:?}", pattern), "CompiledPattern(\"^123.*\")");
    }
}
