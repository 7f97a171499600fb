//! Nesting paths: ordered index sequences addressing a location inside a
//! feature's coordinate tree.
//!
//! A path always starts with a 0-based feature slot; the remaining indices
//! descend through parts, rings, and vertices depending on the geometry
//! kind. A prefix of a path addresses a containing shape. Paths are
//! relations, not owning pointers: any structural edit to the addressed
//! feature invalidates previously computed paths.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An ordered sequence of non-negative indices into a feature's coordinate
/// tree. Never deeper than four levels (MultiPolygon vertex), so the
/// backing store is inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Nesting(SmallVec<[usize; 4]>);

impl Nesting {
    /// Creates a path addressing a whole feature.
    pub fn feature(slot: usize) -> Self {
        let mut inner = SmallVec::new();
        inner.push(slot);
        Self(inner)
    }

    /// The feature slot at the head of the path.
    ///
    /// Paths are built head-first, so an empty path here is a construction
    /// bug, not an interaction artifact.
    pub fn feature_slot(&self) -> usize {
        self.0[0]
    }

    /// The vertex (or deepest) index at the tail of the path.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Returns the path extended by one more index.
    pub fn child(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push(index);
        next
    }

    /// Returns the path without its tail index, i.e. the containing shape.
    pub fn parent(&self) -> Self {
        Self(self.0[..self.0.len().saturating_sub(1)].into())
    }

    /// Replaces the tail index, keeping the containing-shape prefix.
    pub fn with_last(&self, index: usize) -> Self {
        let mut next = self.parent();
        next.push(index);
        next
    }

    /// The indices past the feature slot (a [`Node`](crate::Node) suffix).
    pub fn suffix(&self) -> Self {
        Self(self.0[1..].into())
    }

    /// True when `prefix` is a leading subsequence of this path.
    pub fn starts_with(&self, prefix: &Nesting) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// True when the two paths agree over their common length, meaning one
    /// addresses a shape containing (or equal to) the other. Used to evict
    /// stale entries when a shape multi-selection gains a path that
    /// overlaps an existing one.
    pub fn conflicts_with(&self, other: &Nesting) -> bool {
        let shared = self.0.len().min(other.0.len());
        self.0[..shared] == other.0[..shared]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl std::ops::Index<usize> for Nesting {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl From<&[usize]> for Nesting {
    fn from(indices: &[usize]) -> Self {
        Self(indices.into())
    }
}

impl From<Vec<usize>> for Nesting {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices.into())
    }
}

impl<const N: usize> From<[usize; N]> for Nesting {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.as_slice().into())
    }
}

impl FromIterator<usize> for Nesting {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Nesting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for index in self.iter() {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_relations() {
        let ring: Nesting = [2, 0].into();
        let vertex: Nesting = [2, 0, 3].into();
        assert!(vertex.starts_with(&ring));
        assert!(!ring.starts_with(&vertex));
        assert!(ring.conflicts_with(&vertex));
        assert!(vertex.conflicts_with(&ring));
        assert!(!ring.conflicts_with(&Nesting::from([2, 1])));
    }

    #[test]
    fn tail_rewrites_keep_the_prefix() {
        let vertex: Nesting = [1, 2, 5].into();
        assert_eq!(vertex.with_last(0), Nesting::from([1, 2, 0]));
        assert_eq!(vertex.parent(), Nesting::from([1, 2]));
        assert_eq!(vertex.suffix(), Nesting::from([2, 5]));
    }
}
