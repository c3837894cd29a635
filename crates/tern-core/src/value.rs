use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::atom::AtomHandle;
use crate::error::TernError;
use crate::list::ListValue;
use crate::map::MapValue;
use crate::set::SetValue;
use crate::symbols::{Keyword, Symbol};

/// The closed union of runtime values. Every variant except `Fn` and `Atom`
/// is deeply immutable once handed to a caller; the sole sanctioned mutation
/// on the others is idempotent hash-cache population.
///
/// `Recur` is an internal control value between a tail call and its
/// trampoline; it is never exposed to user code as a normal value.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Arc<str>),
    Keyword(Keyword),
    Symbol(Symbol),
    List(ListValue),
    Map(MapValue),
    Set(SetValue),
    Atom(AtomHandle),
    Fn(FnHandle),
    Recur(Arc<Vec<Value>>),
}

impl Value {
    pub fn str(text: impl Into<String>) -> Value {
        Value::Str(Arc::from(text.into()))
    }

    pub fn keyword(text: &str) -> Value {
        Value::Keyword(Keyword::intern(text))
    }

    pub fn symbol(text: impl Into<String>) -> Value {
        Value::Symbol(Symbol::new(text))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(ListValue::from_vec(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Atom(_) => "atom",
            Value::Fn(_) => "fn",
            Value::Recur(_) => "recur",
        }
    }

    /// Type tag as an interned keyword, e.g. `:list`.
    pub fn type_of(&self) -> Keyword {
        Keyword::intern(self.type_name())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

/// A function value: boxed native callable with reference identity.
/// Reference equality, not hash equality, is authoritative for functions.
#[derive(Clone)]
pub struct FnHandle {
    inner: Arc<FnInner>,
}

struct FnInner {
    name: Option<String>,
    func: Box<dyn Fn(Vec<Value>) -> Result<Value, TernError> + Send + Sync>,
    cached_hash: OnceCell<u64>,
}

impl FnHandle {
    pub fn new<F>(name: Option<String>, func: F) -> FnHandle
    where
        F: Fn(Vec<Value>) -> Result<Value, TernError> + Send + Sync + 'static,
    {
        FnHandle {
            inner: Arc::new(FnInner {
                name,
                func: Box::new(func),
                cached_hash: OnceCell::new(),
            }),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, TernError> {
        (self.inner.func)(args)
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.inner.cached_hash
    }
}

impl PartialEq for FnHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FnHandle {}

impl fmt::Debug for FnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "FnHandle({})", name),
            None => write!(f, "FnHandle(<anonymous>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_cover_variants() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::keyword("a").type_name(), "keyword");
        assert_eq!(Value::list(vec![]).type_name(), "list");
    }

    #[test]
    fn type_of_returns_interned_keyword() {
        let tag = Value::str("x").type_of();
        assert_eq!(tag, Keyword::intern("string"));
    }

    #[test]
    fn fn_handles_compare_by_reference() {
        let f = FnHandle::new(None, |args| Ok(args.into_iter().next().unwrap_or(Value::Nil)));
        let g = FnHandle::new(None, |_| Ok(Value::Nil));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }
}
