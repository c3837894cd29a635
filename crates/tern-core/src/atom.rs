use std::collections::HashMap as StdHashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::{Lazy, OnceCell};

use crate::error::TernError;
use crate::value::{FnHandle, Value};

/// Mutable reference cell: one value slot plus ordered watchers, identified
/// by a path string in the process-wide registry. The only place true
/// mutation is observable in the value model.
#[derive(Clone)]
pub struct AtomHandle {
    inner: Arc<AtomInner>,
}

struct AtomInner {
    path: String,
    value: Mutex<Value>,
    // registration order matters for notification
    watches: Mutex<Vec<(Value, FnHandle)>>,
    cached_hash: OnceCell<u64>,
}

static ATOM_REGISTRY: Lazy<Mutex<StdHashMap<String, AtomHandle>>> =
    Lazy::new(|| Mutex::new(StdHashMap::new()));

impl AtomHandle {
    pub fn new(path: impl Into<String>, initial: Value) -> AtomHandle {
        AtomHandle {
            inner: Arc::new(AtomInner {
                path: path.into(),
                value: Mutex::new(initial),
                watches: Mutex::new(Vec::new()),
                cached_hash: OnceCell::new(),
            }),
        }
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn deref(&self) -> Value {
        self.inner.value.lock().unwrap().clone()
    }

    /// Swap the stored value, then fire every watcher synchronously in
    /// registration order with `(new, previous)`. Watcher errors are not
    /// caught here; they propagate to the caller of `reset`.
    pub fn reset(&self, next: Value) -> Result<(), TernError> {
        let prev = {
            let mut slot = self.inner.value.lock().unwrap();
            std::mem::replace(&mut *slot, next.clone())
        };
        let watchers: Vec<(Value, FnHandle)> = self.inner.watches.lock().unwrap().clone();
        for (_key, callback) in watchers {
            callback.call(vec![next.clone(), prev.clone()])?;
        }
        Ok(())
    }

    /// Upsert a watcher under `key`. Re-adding under the same key replaces
    /// the callback but keeps the original registration position.
    pub fn add_watch(&self, key: Value, callback: FnHandle) {
        let mut watches = self.inner.watches.lock().unwrap();
        if let Some(entry) = watches.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = callback;
        } else {
            watches.push((key, callback));
        }
    }

    pub fn remove_watch(&self, key: &Value) -> bool {
        let mut watches = self.inner.watches.lock().unwrap();
        let before = watches.len();
        watches.retain(|(k, _)| k != key);
        watches.len() != before
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.inner.cached_hash
    }
}

impl PartialEq for AtomHandle {
    fn eq(&self, other: &Self) -> bool {
        // atoms compare by reference; structural comparison of a cell has no
        // defined meaning
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for AtomHandle {}

impl fmt::Debug for AtomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomHandle({})", self.inner.path)
    }
}

/// Register an atom under `path` with `initial` as its value. Re-registering
/// a path replaces the previous atom; atoms live for the process lifetime.
pub fn register(path: &str, initial: Value) -> AtomHandle {
    let atom = AtomHandle::new(path, initial);
    ATOM_REGISTRY
        .lock()
        .unwrap()
        .insert(path.to_string(), atom.clone());
    atom
}

pub fn lookup(path: &str) -> Option<AtomHandle> {
    ATOM_REGISTRY.lock().unwrap().get(path).cloned()
}

/// Current value of the latest atom registered under `path`.
pub fn deref_path(path: &str) -> Option<Value> {
    lookup(path).map(|atom| atom.deref())
}
