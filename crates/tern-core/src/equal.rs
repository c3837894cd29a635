use std::sync::Arc;

use crate::list::ListValue;
use crate::map::MapValue;
use crate::set::SetValue;
use crate::value::Value;

/// Deep structural equality over all variants. Symmetric, reflexive, and
/// transitive within a variant; consistent with [`crate::hash::hash_value`].
/// This is the comparator the persistent trees use for their own internal key
/// matching, so segment-mode and tree-mode lists, and maps with different
/// chain layouts, are indistinguishable to any caller.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Recur is an internal control value; comparing it is a caller error,
        // but it must not panic. Checked before the identity fast paths so a
        // Recur never equals anything, itself included.
        (Value::Recur(_), _) | (_, Value::Recur(_)) => false,
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        // NaN equals itself so the predicate stays reflexive (and lawful as
        // the tree library's key comparator)
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Str(x), Value::Str(y)) => Arc::ptr_eq(x, y) || x == y,
        (Value::Keyword(x), Value::Keyword(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::List(x), Value::List(y)) => list_eq(x, y),
        (Value::Map(x), Value::Map(y)) => map_eq(x, y),
        (Value::Set(x), Value::Set(y)) => set_eq(x, y),
        (Value::Atom(x), Value::Atom(y)) => x == y,
        (Value::Fn(x), Value::Fn(y)) => x == y,
        _ => false,
    }
}

fn list_eq(a: &ListValue, b: &ListValue) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| value_eq(x, y))
}

/// Length first, then every pair of `a` looked up in `b` through the chain;
/// independent of physical chain-layer layout on either side.
fn map_eq(a: &MapValue, b: &MapValue) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.pairs()
        .all(|(k, v)| b.get(k).map_or(false, |w| value_eq(v, w)))
}

fn set_eq(a: &SetValue, b: &SetValue) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|v| b.contains(v))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        value_eq(self, other)
    }
}

impl Eq for Value {}
