//! Variant-dispatch glue the rest of the runtime calls into: generic
//! collection access, coercions between name-like types, and the trampoline
//! that settles `Recur` control values.

use std::sync::Arc;

use crate::error::TernError;
use crate::symbols::{Keyword, Symbol};
use crate::value::{FnHandle, Value};

pub fn count(value: &Value) -> Result<usize, TernError> {
    match value {
        Value::Nil => Ok(0),
        Value::Str(s) => Ok(s.chars().count()),
        Value::List(list) => Ok(list.len()),
        Value::Map(map) => Ok(map.len()),
        Value::Set(set) => Ok(set.len()),
        other => Err(TernError::type_mismatch(
            "countable value",
            other.type_name(),
        )),
    }
}

pub fn is_empty(value: &Value) -> Result<bool, TernError> {
    match value {
        Value::Nil => Ok(true),
        Value::Str(s) => Ok(s.is_empty()),
        Value::List(list) => Ok(list.is_empty()),
        Value::Map(map) => Ok(map.is_empty()),
        Value::Set(set) => Ok(set.is_empty()),
        other => Err(TernError::type_mismatch(
            "countable value",
            other.type_name(),
        )),
    }
}

/// Lookup dispatch: lists index by number, maps by structural key. Absent map
/// keys yield nil; a list index out of range is a range error.
pub fn get(target: &Value, key: &Value) -> Result<Value, TernError> {
    match target {
        Value::List(list) => {
            let idx = list_index(key)?;
            list.get(idx).cloned().ok_or_else(|| {
                TernError::range(format!("index {} beyond list length {}", idx, list.len()))
            })
        }
        Value::Map(map) => Ok(map.get(key).cloned().unwrap_or(Value::Nil)),
        other => Err(TernError::type_mismatch("list or map", other.type_name())),
    }
}

pub fn assoc(target: &Value, key: &Value, value: Value) -> Result<Value, TernError> {
    match target {
        Value::List(list) => Ok(Value::List(list.assoc(list_index(key)?, value)?)),
        Value::Map(map) => Ok(Value::Map(map.assoc(key.clone(), value))),
        other => Err(TernError::type_mismatch("list or map", other.type_name())),
    }
}

pub fn dissoc(target: &Value, key: &Value) -> Result<Value, TernError> {
    match target {
        Value::List(list) => Ok(Value::List(list.dissoc(list_index(key)?)?)),
        Value::Map(map) => Ok(Value::Map(map.dissoc(key))),
        other => Err(TernError::type_mismatch("list or map", other.type_name())),
    }
}

pub fn contains(target: &Value, item: &Value) -> Result<bool, TernError> {
    match target {
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(needle.as_ref())),
            other => Err(TernError::type_mismatch("string", other.type_name())),
        },
        Value::List(list) => Ok(list.iter().any(|v| v == item)),
        Value::Map(map) => Ok(map.contains_key(item)),
        Value::Set(set) => Ok(set.contains(item)),
        other => Err(TernError::type_mismatch(
            "string, list, map or set",
            other.type_name(),
        )),
    }
}

fn list_index(key: &Value) -> Result<usize, TernError> {
    match key {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
        Value::Number(n) => Err(TernError::range(format!("invalid list index {}", n))),
        other => Err(TernError::type_mismatch(
            "number index for lists",
            other.type_name(),
        )),
    }
}

pub fn turn_keyword(value: &Value) -> Result<Keyword, TernError> {
    match value {
        Value::Str(s) => Ok(Keyword::intern(s)),
        Value::Keyword(kw) => Ok(kw.clone()),
        Value::Symbol(sym) => Ok(Keyword::intern(sym.text())),
        other => Err(TernError::type_mismatch(
            "string, keyword or symbol",
            other.type_name(),
        )),
    }
}

pub fn turn_symbol(value: &Value) -> Result<Symbol, TernError> {
    match value {
        Value::Str(s) => Ok(Symbol::new(s.to_string())),
        Value::Symbol(sym) => Ok(sym.clone()),
        Value::Keyword(kw) => Ok(Symbol::new(kw.text())),
        other => Err(TernError::type_mismatch(
            "string, keyword or symbol",
            other.type_name(),
        )),
    }
}

pub fn turn_string(value: &Value) -> Result<String, TernError> {
    match value {
        Value::Nil => Ok(String::new()),
        Value::Str(s) => Ok(s.to_string()),
        Value::Keyword(kw) => Ok(kw.text().to_string()),
        Value::Symbol(sym) => Ok(sym.text().to_string()),
        Value::Number(n) => Ok(crate::value_format::format_number(*n)),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(TernError::type_mismatch(
            "stringable value",
            other.type_name(),
        )),
    }
}

const MAX_RECUR_STEPS: usize = 1000;

/// Drive a function whose result may be the internal `Recur` control value
/// until it settles. `Recur` never escapes to the caller as a normal value.
pub fn trampoline(f: &FnHandle, args: Vec<Value>) -> Result<Value, TernError> {
    let mut result = f.call(args)?;
    let mut steps = 0;
    while let Value::Recur(next) = result {
        if steps >= MAX_RECUR_STEPS {
            return Err(TernError::message(
                "tail recursion did not settle within the step limit",
            ));
        }
        result = f.call(Arc::try_unwrap(next).unwrap_or_else(|shared| (*shared).clone()))?;
        steps += 1;
    }
    Ok(result)
}

/// Left fold over a list or set; the fixed 3-argument shape is part of the
/// contract and checked by [`proc_fold`].
pub fn fold(f: &Value, acc: Value, target: &Value) -> Result<Value, TernError> {
    let Value::Fn(func) = f else {
        return Err(TernError::type_mismatch("fn for folding", f.type_name()));
    };
    match target {
        Value::List(list) => {
            let mut result = acc;
            for item in list.iter() {
                result = func.call(vec![result, item.clone()])?;
            }
            Ok(result)
        }
        Value::Set(set) => {
            let mut result = acc;
            for item in set.iter() {
                result = func.call(vec![result, item.clone()])?;
            }
            Ok(result)
        }
        other => Err(TernError::type_mismatch("list or set", other.type_name())),
    }
}

// Slice-of-arguments entry points used when these operations are invoked as
// function values; the arity of each is a correctness invariant.

pub fn proc_get(args: &[Value]) -> Result<Value, TernError> {
    if args.len() != 2 {
        return Err(TernError::arity(format!("get takes 2 arguments, got {}", args.len())));
    }
    get(&args[0], &args[1])
}

pub fn proc_assoc(args: &[Value]) -> Result<Value, TernError> {
    if args.len() != 3 {
        return Err(TernError::arity(format!(
            "assoc takes 3 arguments, got {}",
            args.len()
        )));
    }
    assoc(&args[0], &args[1], args[2].clone())
}

pub fn proc_dissoc(args: &[Value]) -> Result<Value, TernError> {
    if args.len() != 2 {
        return Err(TernError::arity(format!(
            "dissoc takes 2 arguments, got {}",
            args.len()
        )));
    }
    dissoc(&args[0], &args[1])
}

pub fn proc_fold(args: &[Value]) -> Result<Value, TernError> {
    if args.len() != 3 {
        return Err(TernError::arity(format!(
            "fold takes 3 arguments, got {}",
            args.len()
        )));
    }
    fold(&args[0], args[1].clone(), &args[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapValue;

    #[test]
    fn get_dispatches_by_variant() {
        let list = Value::list(vec![Value::str("a"), Value::str("b")]);
        assert_eq!(get(&list, &Value::Number(1.0)).unwrap(), Value::str("b"));
        assert!(matches!(
            get(&list, &Value::Number(7.0)),
            Err(TernError::Range(_))
        ));
        assert!(matches!(
            get(&list, &Value::str("x")),
            Err(TernError::TypeMismatch { .. })
        ));

        let map = Value::Map(MapValue::from_pairs(vec![(
            Value::keyword("a"),
            Value::Number(1.0),
        )]));
        assert_eq!(get(&map, &Value::keyword("a")).unwrap(), Value::Number(1.0));
        assert_eq!(get(&map, &Value::keyword("zz")).unwrap(), Value::Nil);
    }

    #[test]
    fn arity_is_checked_on_proc_entry_points() {
        assert!(matches!(
            proc_get(&[Value::Nil]),
            Err(TernError::Arity(_))
        ));
        assert!(matches!(
            proc_fold(&[Value::Nil, Value::Nil]),
            Err(TernError::Arity(_))
        ));
    }

    #[test]
    fn trampoline_settles_recur() {
        // counts down through Recur until reaching zero
        let countdown = FnHandle::new(Some("countdown".into()), |args| {
            let n = match args.first() {
                Some(Value::Number(n)) => *n,
                _ => return Err(TernError::type_mismatch("number", "other")),
            };
            if n <= 0.0 {
                Ok(Value::str("done"))
            } else {
                Ok(Value::Recur(Arc::new(vec![Value::Number(n - 1.0)])))
            }
        });
        let result = trampoline(&countdown, vec![Value::Number(10.0)]).unwrap();
        assert_eq!(result, Value::str("done"));
    }

    #[test]
    fn fold_accumulates_in_order() {
        let add = Value::Fn(FnHandle::new(Some("add".into()), |args| {
            match (&args[0], &args[1]) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                _ => Err(TernError::type_mismatch("numbers", "other")),
            }
        }));
        let xs = Value::list(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]);
        assert_eq!(
            fold(&add, Value::Number(0.0), &xs).unwrap(),
            Value::Number(6.0)
        );
    }

    #[test]
    fn coercions_between_name_types() {
        assert_eq!(
            turn_keyword(&Value::str("k")).unwrap(),
            Keyword::intern("k")
        );
        assert_eq!(
            turn_symbol(&Value::keyword("s")).unwrap(),
            Symbol::new("s")
        );
        assert_eq!(turn_string(&Value::Number(3.0)).unwrap(), "3");
        assert_eq!(turn_string(&Value::Nil).unwrap(), "");
        assert!(turn_keyword(&Value::Number(1.0)).is_err());
    }
}
