//! Sequence: singly-linked ordered storage over a slot arena.
//!
//! Nodes live in a per-sequence `SlotMap`; a link is the arena key of the
//! next node. Every node is referenced by exactly one link (its
//! predecessor's `next`, or `head` for the first node), so the chain is
//! acyclic and never shared even though the storage is flat.
//!
//! Broken links are bugs in this module, not caller errors: every place
//! that follows a link panics with the name of the violated invariant.

use core::fmt;
use slotmap::{DefaultKey, SlotMap};

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    next: Option<DefaultKey>,
}

/// Ordered, singly-linked sequence with O(1) append.
///
/// Indices are positions counted from the head and shift down by one for
/// every element after a removed one.
#[derive(Clone)]
pub struct Sequence<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    len: usize,
}

/// Result of [`Sequence::find`]: the first matching element and its index.
#[derive(Debug)]
pub struct Found<'a, T> {
    pub value: &'a T,
    pub index: usize,
}

/// Result of [`Sequence::find_mut`].
#[derive(Debug)]
pub struct FoundMut<'a, T> {
    pub value: &'a mut T,
    pub index: usize,
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, k: DefaultKey) -> &Node<T> {
        self.nodes
            .get(k)
            .expect("sequence link must resolve to a live node")
    }

    fn node_mut(&mut self, k: DefaultKey) -> &mut Node<T> {
        self.nodes
            .get_mut(k)
            .expect("sequence link must resolve to a live node")
    }

    /// Adds `value` as the new tail.
    pub fn append(&mut self, value: T) -> &mut Self {
        let k = self.nodes.insert(Node { value, next: None });
        match self.head {
            None => {
                self.head = Some(k);
                self.tail = Some(k);
            }
            Some(_) => {
                let tail = self.tail.expect("tail must be set when head is set");
                self.node_mut(tail).next = Some(k);
                self.tail = Some(k);
            }
        }
        self.len += 1;
        self
    }

    // First and last positions are O(1); everything else walks from head.
    fn key_at(&self, index: usize) -> Option<DefaultKey> {
        if index >= self.len {
            return None;
        }
        if index == self.len - 1 {
            return Some(self.tail.expect("tail must be set in a non-empty sequence"));
        }
        let mut k = self.head.expect("head must be set in a non-empty sequence");
        for _ in 0..index {
            k = self
                .node(k)
                .next
                .expect("every node before the tail must have a successor");
        }
        Some(k)
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        let k = self.key_at(index)?;
        Some(&self.node(k).value)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        let k = self.key_at(index)?;
        Some(&mut self.node_mut(k).value)
    }

    /// Removes and returns the element at `index`, or `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let removed = if index == 0 {
            let head = self.head.expect("head must be set in a non-empty sequence");
            let node = self
                .nodes
                .remove(head)
                .expect("head must resolve to a live node");
            self.head = node.next;
            if self.head.is_none() {
                self.tail = None;
            }
            node
        } else {
            let prev = self
                .key_at(index - 1)
                .expect("predecessor of an in-range index must exist");
            let target = self
                .node(prev)
                .next
                .expect("predecessor must link to the node being removed");
            let node = self
                .nodes
                .remove(target)
                .expect("removed node must resolve to a live node");
            self.node_mut(prev).next = node.next;
            if self.tail == Some(target) {
                self.tail = Some(prev);
            }
            node
        };
        self.len -= 1;
        Some(removed.value)
    }

    /// Returns the first element, head to tail, for which `predicate` holds.
    pub fn find<P>(&self, mut predicate: P) -> Option<Found<'_, T>>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter()
            .enumerate()
            .find(|&(_, v)| predicate(v))
            .map(|(index, value)| Found { value, index })
    }

    pub fn find_mut<P>(&mut self, mut predicate: P) -> Option<FoundMut<'_, T>>
    where
        P: FnMut(&T) -> bool,
    {
        let mut cursor = self.head;
        let mut index = 0;
        while let Some(k) = cursor {
            let node = self.node(k);
            let next = node.next;
            if predicate(&node.value) {
                return Some(FoundMut {
                    value: &mut self.node_mut(k).value,
                    index,
                });
            }
            cursor = next;
            index += 1;
        }
        None
    }

    /// Visits every element head to tail exactly once.
    pub fn for_each<'a, F>(&'a self, f: F)
    where
        F: FnMut(&'a T),
    {
        self.iter().for_each(f)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            seq: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Walks the whole chain and panics on the first broken invariant.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(
            self.head.is_none(),
            self.len == 0,
            "head must be none iff the sequence is empty"
        );
        assert_eq!(
            self.tail.is_none(),
            self.len == 0,
            "tail must be none iff the sequence is empty"
        );
        assert_eq!(
            self.nodes.len(),
            self.len,
            "arena population must equal len"
        );
        let mut reached = 0;
        let mut last = None;
        let mut cursor = self.head;
        while let Some(k) = cursor {
            reached += 1;
            assert!(reached <= self.len, "chain from head is longer than len");
            last = Some(k);
            cursor = self.node(k).next;
        }
        assert_eq!(reached, self.len, "chain from head is shorter than len");
        assert_eq!(last, self.tail, "tail must be the last node reached from head");
    }

    /// Frees the head's slot while `head` still points at it.
    #[cfg(test)]
    pub(crate) fn free_head_slot(&mut self) {
        if let Some(head) = self.head {
            self.nodes.remove(head);
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Sequence::new();
        seq.extend(iter);
        seq
    }
}

/// Borrowing head-to-tail iterator over a `Sequence`.
pub struct Iter<'a, T> {
    seq: &'a Sequence<T>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let seq: &'a Sequence<T> = self.seq;
        let node = seq.node(self.cursor?);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming head-to-tail iterator; each step is a `remove_at(0)`.
pub struct IntoIter<T>(Sequence<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.remove_at(0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}
