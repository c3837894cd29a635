use std::sync::Arc;

use im::HashMap;
use once_cell::sync::OnceCell;

use crate::value::Value;

/// Chain depth at which a map is squashed back to a single layer. Chosen to
/// balance merge cost against lookup cost; not configurable.
const MAX_CHAIN_DEPTH: usize = 5;

/// A binding inside one chain layer. Tombstones mark keys deleted at that
/// layer; they are an internal representation, never reachable from a user
/// value, so a legitimate value can never be mistaken for a deletion marker.
#[derive(Clone, Debug)]
enum Slot {
    Value(Value),
    Tombstone,
}

type Layer = HashMap<Value, Slot>;

#[derive(Debug)]
struct MapChain {
    layer: Layer,
    next: Option<Arc<MapChain>>,
}

/// Persistent associative map represented as a chain of delta layers, newest
/// first. `merge` prepends the other map's single layer, so it is O(1)
/// regardless of either map's size; lookups scan the chain newest to oldest
/// and stop at the first binding (a tombstone counts as "absent at and below
/// this layer"). Once the chain grows past [`MAX_CHAIN_DEPTH`] it is eagerly
/// collapsed so lookups stay effectively O(log n).
#[derive(Clone, Debug)]
pub struct MapValue {
    chain: Arc<MapChain>,
    depth: usize,
    cached_hash: OnceCell<u64>,
    // lazily computed single-layer view; tombstone-free by construction
    collapsed: OnceCell<Layer>,
}

impl MapValue {
    pub fn new() -> MapValue {
        MapValue::from_layer(Layer::new())
    }

    pub fn from_pairs<I>(pairs: I) -> MapValue
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let layer: Layer = pairs
            .into_iter()
            .map(|(k, v)| (k, Slot::Value(v)))
            .collect();
        MapValue::from_layer(layer)
    }

    fn from_layer(layer: Layer) -> MapValue {
        MapValue {
            chain: Arc::new(MapChain { layer, next: None }),
            depth: 1,
            cached_hash: OnceCell::new(),
            collapsed: OnceCell::new(),
        }
    }

    /// Walk the chain newest to oldest; the first binding found wins. A
    /// tombstone shadows anything older.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let mut cursor: Option<&MapChain> = Some(&self.chain);
        while let Some(node) = cursor {
            match node.layer.get(key) {
                Some(Slot::Value(v)) => return Some(v),
                Some(Slot::Tombstone) => return None,
                None => cursor = node.next.as_deref(),
            }
        }
        None
    }

    /// Chain scan without collapsing; stops at the first hit.
    pub fn contains_key(&self, key: &Value) -> bool {
        let mut cursor: Option<&MapChain> = Some(&self.chain);
        while let Some(node) = cursor {
            match node.layer.get(key) {
                Some(Slot::Value(_)) => return true,
                Some(Slot::Tombstone) => return false,
                None => cursor = node.next.as_deref(),
            }
        }
        false
    }

    /// O(log n of the newest layer), independent of the map's logical size.
    pub fn assoc(&self, key: Value, value: Value) -> MapValue {
        MapValue {
            chain: Arc::new(MapChain {
                layer: self.chain.layer.update(key, Slot::Value(value)),
                next: self.chain.next.clone(),
            }),
            depth: self.depth,
            cached_hash: OnceCell::new(),
            collapsed: OnceCell::new(),
        }
    }

    /// Requires a single-layer view first; intentionally O(map size), since
    /// frequent deletion is not the optimized path.
    pub fn dissoc(&self, key: &Value) -> MapValue {
        MapValue::from_layer(self.collapsed().without(key))
    }

    /// Prepend `other`'s collapsed layer as the newest layer: O(1) in either
    /// map's size. Later bindings win.
    pub fn merge(&self, other: &MapValue) -> MapValue {
        self.compose(other.collapsed().clone())
    }

    /// Like [`merge`](Self::merge), but bindings in `other` structurally equal
    /// to `sentinel` become deletions in the result instead of entries.
    pub fn merge_skip(&self, other: &MapValue, sentinel: &Value) -> MapValue {
        let layer: Layer = other
            .collapsed()
            .iter()
            .map(|(k, slot)| {
                let v = slot_value(slot);
                if v == sentinel {
                    (k.clone(), Slot::Tombstone)
                } else {
                    (k.clone(), slot.clone())
                }
            })
            .collect();
        self.compose(layer)
    }

    fn compose(&self, head: Layer) -> MapValue {
        let merged = MapValue {
            chain: Arc::new(MapChain {
                layer: head,
                next: Some(self.chain.clone()),
            }),
            depth: self.depth + 1,
            cached_hash: OnceCell::new(),
            collapsed: OnceCell::new(),
        };
        if merged.depth > MAX_CHAIN_DEPTH {
            MapValue::from_layer(merged.collapsed().clone())
        } else {
            merged
        }
    }

    pub fn len(&self) -> usize {
        self.collapsed().len()
    }

    /// True iff no binding survives the chain. Walks layers without
    /// collapsing, tracking tombstoned keys seen in newer layers.
    pub fn is_empty(&self) -> bool {
        let mut tombstoned: Vec<&Value> = Vec::new();
        let mut cursor: Option<&MapChain> = Some(&self.chain);
        while let Some(node) = cursor {
            for (key, slot) in node.layer.iter() {
                match slot {
                    Slot::Tombstone => tombstoned.push(key),
                    Slot::Value(_) => {
                        if !tombstoned.iter().any(|t| *t == key) {
                            return false;
                        }
                    }
                }
            }
            cursor = node.next.as_deref();
        }
        true
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.collapsed_ref()
            .iter()
            .map(|(k, slot)| (k, slot_value(slot)))
    }

    /// Current chain depth; bounded by [`MAX_CHAIN_DEPTH`].
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Single-layer view, computed once per instance. Folds oldest to newest,
    /// honoring tombstones; idempotent, so a racing double-compute is safe.
    fn collapsed(&self) -> &Layer {
        self.collapsed_ref()
    }

    fn collapsed_ref(&self) -> &Layer {
        self.collapsed.get_or_init(|| {
            if self.depth == 1 {
                // fresh single-layer maps never contain tombstones
                return self.chain.layer.clone();
            }
            let mut layers: Vec<&Layer> = Vec::with_capacity(self.depth);
            let mut cursor: Option<&MapChain> = Some(&self.chain);
            while let Some(node) = cursor {
                layers.push(&node.layer);
                cursor = node.next.as_deref();
            }
            let mut folded = Layer::new();
            for layer in layers.into_iter().rev() {
                for (key, slot) in layer.iter() {
                    match slot {
                        Slot::Value(_) => {
                            folded.insert(key.clone(), slot.clone());
                        }
                        Slot::Tombstone => {
                            folded.remove(key);
                        }
                    }
                }
            }
            folded
        })
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.cached_hash
    }
}

impl Default for MapValue {
    fn default() -> Self {
        MapValue::new()
    }
}

fn slot_value(slot: &Slot) -> &Value {
    match slot {
        Slot::Value(v) => v,
        // collapsed layers are tombstone-free by construction
        Slot::Tombstone => unreachable!("tombstone survived collapse"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(name: &str) -> Value {
        Value::keyword(name)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn assoc_keeps_depth_and_shares_tail() {
        let base = MapValue::from_pairs(vec![(kw("a"), num(1.0))]);
        let next = base.assoc(kw("b"), num(2.0));
        assert_eq!(next.depth(), base.depth());
        assert_eq!(next.get(&kw("a")), Some(&num(1.0)));
        assert_eq!(next.get(&kw("b")), Some(&num(2.0)));
        assert_eq!(base.get(&kw("b")), None);
    }

    #[test]
    fn merge_later_bindings_win() {
        let a = MapValue::from_pairs(vec![(kw("a"), num(1.0))]);
        let b = MapValue::from_pairs(vec![(kw("a"), num(2.0)), (kw("b"), num(3.0))]);
        let merged = a.merge(&b);
        assert_eq!(merged.get(&kw("a")), Some(&num(2.0)));
        assert_eq!(merged.get(&kw("b")), Some(&num(3.0)));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_skip_tombstones_shadow_older_layers() {
        let sentinel = kw("gone");
        let base = MapValue::from_pairs(vec![(kw("a"), num(1.0)), (kw("b"), num(2.0))]);
        let deletions = MapValue::from_pairs(vec![(kw("a"), sentinel.clone())]);
        let merged = base.merge_skip(&deletions, &sentinel);
        assert!(!merged.contains_key(&kw("a")));
        assert_eq!(merged.get(&kw("a")), None);
        assert_eq!(merged.get(&kw("b")), Some(&num(2.0)));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn depth_is_bounded() {
        let mut acc = MapValue::from_pairs(vec![(kw("k0"), num(0.0))]);
        for i in 1..40 {
            let layer = MapValue::from_pairs(vec![(kw(&format!("k{}", i)), num(i as f64))]);
            acc = acc.merge(&layer);
            assert!(acc.depth() <= MAX_CHAIN_DEPTH, "depth {} at step {}", acc.depth(), i);
        }
        assert_eq!(acc.len(), 40);
    }

    #[test]
    fn is_empty_respects_tombstones_without_collapsing() {
        let sentinel = kw("gone");
        let base = MapValue::from_pairs(vec![(kw("a"), num(1.0))]);
        let deletions = MapValue::from_pairs(vec![(kw("a"), sentinel.clone())]);
        let merged = base.merge_skip(&deletions, &sentinel);
        assert!(merged.is_empty());
        assert!(MapValue::new().is_empty());
        assert!(!base.is_empty());
    }

    #[test]
    fn dissoc_collapses_then_removes() {
        let a = MapValue::from_pairs(vec![(kw("a"), num(1.0)), (kw("b"), num(2.0))]);
        let b = a.dissoc(&kw("a"));
        assert_eq!(b.len(), 1);
        assert_eq!(b.get(&kw("a")), None);
        assert_eq!(a.len(), 2);
    }
}
