use std::collections::HashMap as StdHashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::{Lazy, OnceCell};

/// Interned keyword. Two keywords with equal text are the same allocation, so
/// equality and hashing are O(1) by identity after interning.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<KeywordInner>,
}

pub(crate) struct KeywordInner {
    text: String,
    pub(crate) cached_hash: OnceCell<u64>,
}

static KEYWORD_REGISTRY: Lazy<Mutex<StdHashMap<String, Keyword>>> =
    Lazy::new(|| Mutex::new(StdHashMap::new()));

impl Keyword {
    /// Intern `text`, returning the process-wide unique keyword for it.
    /// Idempotent; interned keywords live for the process lifetime.
    pub fn intern(text: &str) -> Keyword {
        let mut registry = KEYWORD_REGISTRY.lock().unwrap();
        if let Some(existing) = registry.get(text) {
            return existing.clone();
        }
        let kw = Keyword {
            inner: Arc::new(KeywordInner {
                text: text.to_string(),
                cached_hash: OnceCell::new(),
            }),
        };
        registry.insert(text.to_string(), kw.clone());
        kw
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.inner.cached_hash
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        // interning guarantees reference equality for equal text
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.inner.text)
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self.inner.text)
    }
}

/// Plain symbol. Not interned; compares by text.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<SymbolInner>,
}

pub(crate) struct SymbolInner {
    text: String,
    pub(crate) cached_hash: OnceCell<u64>,
}

impl Symbol {
    pub fn new(text: impl Into<String>) -> Symbol {
        Symbol {
            inner: Arc::new(SymbolInner {
                text: text.into(),
                cached_hash: OnceCell::new(),
            }),
        }
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.inner.cached_hash
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.text == other.inner.text
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.inner.text)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.inner.text)
    }
}
