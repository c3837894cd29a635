use std::fmt;

use crate::list::ListValue;
use crate::map::MapValue;
use crate::set::SetValue;
use crate::value::Value;

/// Human-readable rendering: strings appear bare, everything else as in
/// [`pr_str`].
pub fn format_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, false);
    out
}

/// Machine-parseable rendering: strings are escaped and quoted.
pub fn escaped_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, true);
    out
}

/// Escaped renderings of `args` joined with spaces.
pub fn pr_str(args: &[Value]) -> String {
    args.iter()
        .map(escaped_value)
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_value(out: &mut String, value: &Value, escaped: bool) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Str(s) => {
            if escaped {
                out.push('"');
                out.push_str(&escape_string_fragment(s));
                out.push('"');
            } else {
                out.push_str(s);
            }
        }
        Value::Keyword(kw) => out.push_str(&kw.to_string()),
        Value::Symbol(sym) => out.push_str(&sym.to_string()),
        Value::List(list) => write_list(out, list),
        Value::Map(map) => write_map(out, map),
        Value::Set(set) => write_set(out, set),
        Value::Atom(atom) => {
            out.push_str("(&atom ");
            write_value(out, &atom.deref(), true);
            out.push(')');
        }
        Value::Fn(f) => match f.name() {
            Some(name) => {
                out.push_str("(&fn ");
                out.push_str(name);
                out.push(')');
            }
            None => out.push_str("(&fn ...)"),
        },
        Value::Recur(_) => out.push_str("(&recur ...)"),
    }
}

fn write_list(out: &mut String, list: &ListValue) {
    out.push('[');
    for (idx, item) in list.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        write_value(out, item, true);
    }
    out.push(']');
}

fn write_map(out: &mut String, map: &MapValue) {
    out.push('{');
    for (idx, (k, v)) in map.pairs().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_value(out, k, true);
        out.push(' ');
        write_value(out, v, true);
    }
    out.push('}');
}

fn write_set(out: &mut String, set: &SetValue) {
    // sorted for a stable rendering; sets have no iteration order of their own
    let mut parts: Vec<String> = set.iter().map(escaped_value).collect();
    parts.sort();
    out.push_str("#{");
    out.push_str(&parts.join(" "));
    out.push('}');
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn escape_string_fragment(text: &str) -> String {
    let escaped = format!("{:?}", text);
    // strip the surrounding quotes Debug adds
    escaped[1..escaped.len() - 1].to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_value(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomHandle;
    use crate::map::MapValue;

    #[test]
    fn numbers_print_like_integers_when_whole() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn strings_escape_only_in_pr_str() {
        let v = Value::str("a\"b");
        assert_eq!(format_value(&v), "a\"b");
        assert_eq!(pr_str(&[v]), "\"a\\\"b\"");
    }

    #[test]
    fn collections_render_with_delimiters() {
        let list = Value::list(vec![Value::Number(1.0), Value::keyword("k")]);
        assert_eq!(format_value(&list), "[1 :k]");
        let map = Value::Map(MapValue::from_pairs(vec![(
            Value::keyword("a"),
            Value::Number(1.0),
        )]));
        assert_eq!(format_value(&map), "{:a 1}");
    }

    #[test]
    fn atoms_render_opaquely() {
        let atom = Value::Atom(AtomHandle::new("fmt/a", Value::Number(1.0)));
        assert_eq!(format_value(&atom), "(&atom 1)");
    }
}
