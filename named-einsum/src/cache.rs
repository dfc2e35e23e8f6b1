//! Memoization of translations

use crate::{error::Result, expression::ParsedExpression};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{str::FromStr, sync::Arc};

static GLOBAL: Lazy<Arc<TranslationCache>> = Lazy::new(|| Arc::new(TranslationCache::new()));

/// Cache of [ParsedExpression] keyed by the notation text
///
/// Compilation is a pure function of the text, so that an entry never
/// becomes stale and is never evicted. This can be shared between threads;
/// when two threads compile the same text at once, the first insertion
/// wins and the other result is discarded.
///
/// ```
/// use named_einsum::cache::TranslationCache;
/// use std::sync::Arc;
///
/// let cache = TranslationCache::new();
/// let a = cache.get_or_compile("A[i, j], B[j, k] -> C[i, k]").unwrap();
/// let b = cache.get_or_compile("A[i, j], B[j, k] -> C[i, k]").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(a.subscripts(), "AB,BC->AC");
/// ```
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<String, Arc<ParsedExpression>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        TranslationCache {
            entries: DashMap::new(),
        }
    }

    /// Process-wide cache used when no cache is given explicitly
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Compiled expression of `notation`, compiled at the first call
    ///
    /// Failures are not cached.
    pub fn get_or_compile(&self, notation: &str) -> Result<Arc<ParsedExpression>> {
        if let Some(entry) = self.entries.get(notation) {
            return Ok(Arc::clone(entry.value()));
        }
        tracing::debug!(notation, "translation cache miss");
        let parsed = Arc::new(ParsedExpression::from_str(notation)?);
        let entry = self.entries.entry(notation.to_string()).or_insert(parsed);
        Ok(Arc::clone(entry.value()))
    }

    pub fn contains(&self, notation: &str) -> bool {
        self.entries.contains_key(notation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
