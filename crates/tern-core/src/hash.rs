use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Value;

/// Structural hashing: each variant folds a distinct base tag with its
/// content through an FNV-1a mix. Composite and identity-like variants cache
/// the computed hash on the instance; the population is idempotent, so a
/// racing double-compute wastes work but never corrupts the result.
///
/// Consistent with [`crate::equal::value_eq`]: equal values hash equal.
pub fn hash_value(value: &Value) -> u64 {
    match value {
        Value::Nil => base_hash("nil:"),
        Value::Bool(true) => base_hash("true:"),
        Value::Bool(false) => base_hash("false:"),
        Value::Number(n) => mix_word(base_hash("number:"), canonical_bits(*n)),
        Value::Str(s) => mix_str(base_hash("string:"), s),
        Value::Keyword(kw) => *kw
            .hash_cell()
            .get_or_init(|| mix_str(base_hash("keyword:"), kw.text())),
        Value::Symbol(sym) => *sym
            .hash_cell()
            .get_or_init(|| mix_str(base_hash("symbol:"), sym.text())),
        // two distinct functions are extremely unlikely to collide, but
        // reference equality, not hash equality, is authoritative for them
        Value::Fn(f) => *f
            .hash_cell()
            .get_or_init(|| mix_word(base_hash("fn:"), next_fn_hash_seed())),
        Value::Atom(atom) => *atom
            .hash_cell()
            .get_or_init(|| mix_str(base_hash("atom:"), atom.path())),
        Value::List(list) => *list.hash_cell().get_or_init(|| {
            let mut acc = base_hash("list:");
            for item in list.iter() {
                acc = mix_word(acc, hash_value(item));
            }
            acc
        }),
        // pair iteration order is a per-instance artifact of the backing
        // table, so pairs combine commutatively like set members
        Value::Map(map) => *map.hash_cell().get_or_init(|| {
            let mut sum: u64 = 0;
            for (k, v) in map.pairs() {
                sum = sum.wrapping_add(mix_word(hash_value(k), hash_value(v)));
            }
            mix_word(base_hash("map:"), sum)
        }),
        // sets are unordered: accumulate member hashes with an
        // order-independent combiner before folding into the base
        Value::Set(set) => *set.hash_cell().get_or_init(|| {
            let mut sum: u64 = 0;
            for item in set.iter() {
                sum = sum.wrapping_add(hash_value(item));
            }
            mix_word(base_hash("set:"), sum)
        }),
        Value::Recur(args) => {
            let mut acc = base_hash("recur:");
            for item in args.iter() {
                acc = mix_word(acc, hash_value(item));
            }
            acc
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn base_hash(tag: &str) -> u64 {
    mix_bytes(FNV_OFFSET, tag.as_bytes())
}

fn mix_str(acc: u64, text: &str) -> u64 {
    mix_bytes(acc, text.as_bytes())
}

fn mix_word(acc: u64, word: u64) -> u64 {
    mix_bytes(acc, &word.to_le_bytes())
}

fn mix_bytes(mut acc: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        acc ^= u64::from(*byte);
        acc = acc.wrapping_mul(FNV_PRIME);
    }
    acc
}

/// Numbers hash by value: -0.0 hashes like 0.0 and every NaN hashes alike,
/// matching the equality rules.
fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

static FN_HASH_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_fn_hash_seed() -> u64 {
    FN_HASH_COUNTER.fetch_add(1, Ordering::Relaxed)
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(hash_value(self));
    }
}
