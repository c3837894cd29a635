use im::HashSet;
use once_cell::sync::OnceCell;

use crate::list::ListValue;
use crate::value::Value;

/// Unordered, duplicate-free container. Membership and hashing use the same
/// structural equality as every other variant; hashing is order-independent.
#[derive(Clone, Debug)]
pub struct SetValue {
    items: HashSet<Value>,
    cached_hash: OnceCell<u64>,
}

impl SetValue {
    pub fn new() -> SetValue {
        SetValue::from_set(HashSet::new())
    }

    pub fn from_iter<I>(items: I) -> SetValue
    where
        I: IntoIterator<Item = Value>,
    {
        SetValue::from_set(items.into_iter().collect())
    }

    fn from_set(items: HashSet<Value>) -> SetValue {
        SetValue {
            items,
            cached_hash: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    pub fn insert(&self, value: Value) -> SetValue {
        SetValue::from_set(self.items.update(value))
    }

    pub fn remove(&self, value: &Value) -> SetValue {
        SetValue::from_set(self.items.without(value))
    }

    pub fn union(&self, other: &SetValue) -> SetValue {
        SetValue::from_set(self.items.clone().union(other.items.clone()))
    }

    /// Members of `self` absent from `other`.
    pub fn difference(&self, other: &SetValue) -> SetValue {
        SetValue::from_set(self.items.clone().relative_complement(other.items.clone()))
    }

    pub fn intersection(&self, other: &SetValue) -> SetValue {
        SetValue::from_set(self.items.clone().intersection(other.items.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Members as a list, in set-iteration order.
    pub fn to_list(&self) -> ListValue {
        ListValue::from_vec(self.items.iter().cloned().collect())
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.cached_hash
    }
}

impl Default for SetValue {
    fn default() -> Self {
        SetValue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_membership_are_structural() {
        let set = SetValue::from_iter(vec![Value::list(vec![Value::Number(1.0)])]);
        assert!(set.contains(&Value::list(vec![Value::Number(1.0)])));
        assert!(!set.contains(&Value::list(vec![Value::Number(2.0)])));
    }

    #[test]
    fn insert_deduplicates() {
        let set = SetValue::from_iter(vec![Value::Number(1.0)]).insert(Value::Number(1.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_returns_new_set() {
        let a = SetValue::from_iter(vec![Value::Number(1.0), Value::Number(2.0)]);
        let b = a.remove(&Value::Number(1.0));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn set_algebra() {
        let nums = |xs: &[f64]| SetValue::from_iter(xs.iter().map(|n| Value::Number(*n)));
        let a = nums(&[1.0, 2.0, 3.0]);
        let b = nums(&[2.0, 3.0, 4.0]);

        let union = a.union(&b);
        assert_eq!(union.len(), 4);
        assert!(union.contains(&Value::Number(1.0)));
        assert!(union.contains(&Value::Number(4.0)));

        let diff = a.difference(&b);
        assert_eq!(diff.len(), 1);
        assert!(diff.contains(&Value::Number(1.0)));
        assert!(!diff.contains(&Value::Number(4.0)));

        let inter = a.intersection(&b);
        assert_eq!(inter.len(), 2);
        assert!(inter.contains(&Value::Number(2.0)));
        assert!(inter.contains(&Value::Number(3.0)));

        // inputs untouched
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
    }
}
