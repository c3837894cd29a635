use std::sync::Arc;

use im::Vector;
use once_cell::sync::OnceCell;

use crate::error::TernError;
use crate::value::Value;

/// Persistent ordered sequence with two representations:
///
/// - *segment mode*: a shared backing buffer plus `[start, end)` bounds.
///   O(1) slice without copying, O(1) indexed access. Purely a
///   construction/traversal fast path; never observable as different
///   semantics.
/// - *tree mode*: an `im::Vector` giving O(log n) structural-sharing update.
///
/// Any structural update on a segment-mode list first promotes a private
/// snapshot to tree mode; the shared buffer is never mutated, so other views
/// over it are unaffected.
#[derive(Clone, Debug)]
pub struct ListValue {
    repr: ListRepr,
    cached_hash: OnceCell<u64>,
}

#[derive(Clone, Debug)]
enum ListRepr {
    Segment {
        buf: Arc<Vec<Value>>,
        start: usize,
        end: usize,
    },
    Tree(Vector<Value>),
}

impl ListValue {
    pub fn from_vec(items: Vec<Value>) -> ListValue {
        let end = items.len();
        ListValue {
            repr: ListRepr::Segment {
                buf: Arc::new(items),
                start: 0,
                end,
            },
            cached_hash: OnceCell::new(),
        }
    }

    pub fn from_tree(tree: Vector<Value>) -> ListValue {
        ListValue {
            repr: ListRepr::Tree(tree),
            cached_hash: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            ListRepr::Segment { start, end, .. } => end - start,
            ListRepr::Tree(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        match &self.repr {
            ListRepr::Segment { buf, start, end } => {
                if start + idx < *end {
                    buf.get(start + idx)
                } else {
                    None
                }
            }
            ListRepr::Tree(tree) => tree.get(idx),
        }
    }

    pub fn first(&self) -> Option<&Value> {
        self.get(0)
    }

    /// O(1) in segment mode: a new view over the same backing buffer.
    pub fn slice(&self, from: usize, to: usize) -> Result<ListValue, TernError> {
        if from > to {
            return Err(TernError::range(format!(
                "slice start {} is beyond end {}",
                from, to
            )));
        }
        if to > self.len() {
            return Err(TernError::range(format!(
                "slice end {} is beyond list length {}",
                to,
                self.len()
            )));
        }
        match &self.repr {
            ListRepr::Segment { buf, start, .. } => Ok(ListValue {
                repr: ListRepr::Segment {
                    buf: buf.clone(),
                    start: start + from,
                    end: start + to,
                },
                cached_hash: OnceCell::new(),
            }),
            ListRepr::Tree(tree) => {
                let mut rest = tree.clone();
                let sub = rest.slice(from..to);
                Ok(ListValue::from_tree(sub))
            }
        }
    }

    pub fn rest(&self) -> Result<ListValue, TernError> {
        if self.is_empty() {
            return Err(TernError::range("rest of an empty list"));
        }
        self.slice(1, self.len())
    }

    pub fn assoc(&self, idx: usize, value: Value) -> Result<ListValue, TernError> {
        if idx >= self.len() {
            return Err(TernError::range(format!(
                "assoc index {} is beyond list length {}",
                idx,
                self.len()
            )));
        }
        Ok(ListValue::from_tree(self.to_tree().update(idx, value)))
    }

    pub fn dissoc(&self, idx: usize) -> Result<ListValue, TernError> {
        if idx >= self.len() {
            return Err(TernError::range(format!(
                "dissoc index {} is beyond list length {}",
                idx,
                self.len()
            )));
        }
        let mut tree = self.to_tree();
        tree.remove(idx);
        Ok(ListValue::from_tree(tree))
    }

    pub fn push(&self, value: Value) -> ListValue {
        let mut tree = self.to_tree();
        tree.push_back(value);
        ListValue::from_tree(tree)
    }

    pub fn prepend(&self, value: Value) -> ListValue {
        let mut tree = self.to_tree();
        tree.push_front(value);
        ListValue::from_tree(tree)
    }

    pub fn concat(&self, other: &ListValue) -> ListValue {
        let mut tree = self.to_tree();
        tree.append(other.to_tree());
        ListValue::from_tree(tree)
    }

    pub fn reverse(&self) -> ListValue {
        ListValue::from_tree(self.iter().rev().cloned().collect())
    }

    pub fn map<F>(&self, f: F) -> Result<ListValue, TernError>
    where
        F: FnMut(&Value) -> Result<Value, TernError>,
    {
        let items: Vec<Value> = self.iter().map(f).collect::<Result<_, _>>()?;
        Ok(ListValue::from_vec(items))
    }

    pub fn iter(&self) -> ListIter<'_> {
        match &self.repr {
            ListRepr::Segment { buf, start, end } => ListIter::Segment(buf[*start..*end].iter()),
            ListRepr::Tree(tree) => ListIter::Tree(tree.iter()),
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    /// Whether this instance is still on the segment fast path. Only a
    /// performance observation; semantics are identical in both modes.
    pub fn is_segment(&self) -> bool {
        matches!(self.repr, ListRepr::Segment { .. })
    }

    /// Tree-mode copy of this list (the "turn-tree" transition applied to a
    /// private snapshot).
    pub fn promoted(&self) -> ListValue {
        ListValue::from_tree(self.to_tree())
    }

    fn to_tree(&self) -> Vector<Value> {
        match &self.repr {
            ListRepr::Segment { buf, start, end } => buf[*start..*end].iter().cloned().collect(),
            ListRepr::Tree(tree) => tree.clone(),
        }
    }

    pub(crate) fn hash_cell(&self) -> &OnceCell<u64> {
        &self.cached_hash
    }
}

impl FromIterator<Value> for ListValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ListValue::from_vec(iter.into_iter().collect())
    }
}

pub enum ListIter<'a> {
    Segment(std::slice::Iter<'a, Value>),
    Tree(im::vector::Iter<'a, Value>),
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self {
            ListIter::Segment(iter) => iter.next(),
            ListIter::Tree(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ListIter::Segment(iter) => iter.size_hint(),
            ListIter::Tree(iter) => iter.size_hint(),
        }
    }
}

impl<'a> DoubleEndedIterator for ListIter<'a> {
    fn next_back(&mut self) -> Option<&'a Value> {
        match self {
            ListIter::Segment(iter) => iter.next_back(),
            ListIter::Tree(iter) => iter.next_back(),
        }
    }
}

impl<'a> ExactSizeIterator for ListIter<'a> {}
