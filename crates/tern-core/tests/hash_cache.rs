use std::sync::Arc;
use std::thread;

use tern_core::hash::hash_value;
use tern_core::{MapValue, Value};

fn deep_value() -> Value {
    let inner = Value::list((0..64).map(|i| Value::Number(i as f64)).collect());
    let map = MapValue::from_pairs(vec![
        (Value::keyword("xs"), inner.clone()),
        (Value::keyword("name"), Value::str("shared")),
    ]);
    Value::list(vec![inner, Value::Map(map)])
}

#[test]
fn hashing_twice_yields_the_same_value() {
    let v = deep_value();
    assert_eq!(hash_value(&v), hash_value(&v));
}

#[test]
fn concurrent_double_compute_does_not_corrupt_the_cache() {
    let v = Arc::new(deep_value());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let v = v.clone();
        handles.push(thread::spawn(move || hash_value(&v)));
    }
    let hashes: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = hashes[0];
    assert!(hashes.iter().all(|h| *h == first));
    assert_eq!(hash_value(&v), first);
}

#[test]
fn clones_agree_with_their_source() {
    let v = deep_value();
    let before_cache = v.clone();
    let h = hash_value(&v);
    let after_cache = v.clone();
    assert_eq!(hash_value(&before_cache), h);
    assert_eq!(hash_value(&after_cache), h);
}
