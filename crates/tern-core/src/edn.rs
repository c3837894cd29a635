use crate::error::TernError;
use crate::list::ListValue;
use crate::map::MapValue;
use crate::set::SetValue;
use crate::value::Value;
use crate::value_format::format_number;

/// Generic tagged-array edn notation: a tree of leaves and branches where the
/// first element of a branch tags its shape (`"[]"` list, `"{}"` map, `"#{}"`
/// set) and leaves carry prefixed scalar encodings.
#[derive(Clone, Debug, PartialEq)]
pub enum EdnTree {
    Leaf(String),
    Branch(Vec<EdnTree>),
}

impl EdnTree {
    pub fn leaf(text: impl Into<String>) -> EdnTree {
        EdnTree::Leaf(text.into())
    }
}

/// Total except for `Fn`/`Atom`/`Recur`, which fail fast.
pub fn to_edn(value: &Value) -> Result<EdnTree, TernError> {
    match value {
        Value::Nil => Ok(EdnTree::leaf("nil")),
        Value::Bool(b) => Ok(EdnTree::leaf(if *b { "true" } else { "false" })),
        Value::Number(n) => Ok(EdnTree::leaf(format_number(*n))),
        Value::Str(s) => Ok(EdnTree::leaf(format!("|{}", s))),
        Value::Keyword(kw) => Ok(EdnTree::leaf(format!(":{}", kw.text()))),
        Value::Symbol(sym) => Ok(EdnTree::leaf(format!("'{}", sym.text()))),
        Value::List(list) => {
            let mut branch = vec![EdnTree::leaf("[]")];
            for item in list.iter() {
                branch.push(to_edn(item)?);
            }
            Ok(EdnTree::Branch(branch))
        }
        Value::Map(map) => {
            let mut branch = vec![EdnTree::leaf("{}")];
            for (k, v) in map.pairs() {
                branch.push(EdnTree::Branch(vec![to_edn(k)?, to_edn(v)?]));
            }
            Ok(EdnTree::Branch(branch))
        }
        Value::Set(set) => {
            let mut branch = vec![EdnTree::leaf("#{}")];
            for item in set.iter() {
                branch.push(to_edn(item)?);
            }
            Ok(EdnTree::Branch(branch))
        }
        Value::Atom(_) | Value::Fn(_) | Value::Recur(_) => Err(TernError::conversion(format!(
            "{} value to edn",
            value.type_name()
        ))),
    }
}

pub fn from_edn(tree: &EdnTree) -> Result<Value, TernError> {
    match tree {
        EdnTree::Leaf(text) => leaf_to_value(text),
        EdnTree::Branch(items) => {
            let Some(EdnTree::Leaf(head)) = items.first() else {
                return Err(TernError::conversion("edn branch must start with a tag"));
            };
            match head.as_str() {
                "[]" => Ok(Value::List(ListValue::from_vec(
                    items[1..].iter().map(from_edn).collect::<Result<_, _>>()?,
                ))),
                "#{}" => Ok(Value::Set(SetValue::from_iter(
                    items[1..]
                        .iter()
                        .map(from_edn)
                        .collect::<Result<Vec<_>, _>>()?,
                ))),
                "{}" => {
                    let mut pairs = Vec::with_capacity(items.len() - 1);
                    for entry in &items[1..] {
                        let EdnTree::Branch(pair) = entry else {
                            return Err(TernError::conversion("expected pairs for edn map"));
                        };
                        if pair.len() != 2 {
                            return Err(TernError::conversion("expected pairs for edn map"));
                        }
                        pairs.push((from_edn(&pair[0])?, from_edn(&pair[1])?));
                    }
                    Ok(Value::Map(MapValue::from_pairs(pairs)))
                }
                "do" if items.len() == 2 => from_edn(&items[1]),
                "quote" => {
                    if items.len() != 2 {
                        return Err(TernError::conversion("quote expects 1 argument"));
                    }
                    Ok(quoted_value(&items[1]))
                }
                other => Err(TernError::conversion(format!(
                    "unexpected edn branch tag '{}'",
                    other
                ))),
            }
        }
    }
}

fn leaf_to_value(text: &str) -> Result<Value, TernError> {
    match text {
        "nil" => return Ok(Value::Nil),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "" => return Err(TernError::conversion("edn leaf cannot be empty")),
        _ => {}
    }
    let Some(first) = text.chars().next() else {
        return Err(TernError::conversion("edn leaf cannot be empty"));
    };
    match first {
        '|' | '"' => Ok(Value::str(&text[1..])),
        ':' => Ok(Value::keyword(&text[1..])),
        '\'' => Ok(Value::symbol(&text[1..])),
        _ => {
            if looks_numeric(text) {
                text.parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| TernError::conversion(format!("malformed edn number '{}'", text)))
            } else {
                // raw strings are accepted; quoted macro trees pass through here
                Ok(Value::str(text))
            }
        }
    }
}

fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.is_empty() {
        return false;
    }
    let mut seen_dot = false;
    for c in body.chars() {
        if c == '.' {
            if seen_dot {
                return false;
            }
            seen_dot = true;
        } else if !c.is_ascii_digit() {
            return false;
        }
    }
    true
}

/// Quote drops into plain data: leaves become keywords or strings, branches
/// become lists.
fn quoted_value(tree: &EdnTree) -> Value {
    match tree {
        EdnTree::Leaf(text) => {
            if let Some(rest) = text.strip_prefix(':') {
                Value::keyword(rest)
            } else {
                Value::str(text.as_str())
            }
        }
        EdnTree::Branch(items) => Value::List(ListValue::from_vec(
            items.iter().map(quoted_value).collect(),
        )),
    }
}
