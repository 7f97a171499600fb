//! The active-selection value and its two representations.
//!
//! A selection is either a list of whole-feature slots or a list of
//! nesting paths addressing sub-shapes. The two never mix inside one
//! value; the modifier-key toggle converts between them.

use serde::{Deserialize, Serialize};

use crate::geometry::Nesting;

/// One entry of a selection-shaped state set: a whole feature or a
/// sub-shape path. The features layer of the state store is keyed by this,
/// so hover can mirror whichever representation the active selection uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeRef {
    Feature(usize),
    Shape(Nesting),
}

impl ShapeRef {
    /// The feature slot this entry lives under.
    pub fn slot(&self) -> usize {
        match self {
            ShapeRef::Feature(slot) => *slot,
            ShapeRef::Shape(path) => path.feature_slot(),
        }
    }

    /// The entry as a path (a feature entry becomes a one-index path).
    pub fn as_path(&self) -> Nesting {
        match self {
            ShapeRef::Feature(slot) => Nesting::feature(*slot),
            ShapeRef::Shape(path) => path.clone(),
        }
    }
}

/// The current selection value: feature-level multi-select or shape-level
/// paths within one or several features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActiveSelection {
    Features(Vec<usize>),
    Shapes(Vec<Nesting>),
}

impl ActiveSelection {
    pub fn empty() -> Self {
        ActiveSelection::Features(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ActiveSelection::Features(slots) => slots.is_empty(),
            ActiveSelection::Shapes(paths) => paths.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ActiveSelection::Features(slots) => slots.len(),
            ActiveSelection::Shapes(paths) => paths.len(),
        }
    }

    pub fn is_feature_level(&self) -> bool {
        matches!(self, ActiveSelection::Features(_))
    }

    /// The feature slots the selection touches, in entry order.
    pub fn slots(&self) -> Vec<usize> {
        match self {
            ActiveSelection::Features(slots) => slots.clone(),
            ActiveSelection::Shapes(paths) => paths.iter().map(Nesting::feature_slot).collect(),
        }
    }

    pub fn contains_slot(&self, slot: usize) -> bool {
        self.slots().contains(&slot)
    }

    /// Converts to the shape-level representation without changing which
    /// shapes are conceptually selected: each feature slot becomes a
    /// one-index path.
    pub fn into_shapes(self) -> Self {
        match self {
            ActiveSelection::Features(slots) => {
                ActiveSelection::Shapes(slots.into_iter().map(Nesting::feature).collect())
            }
            shapes => shapes,
        }
    }

    /// Converts to the feature-level representation: each path collapses
    /// to its feature slot. Inverse of [`into_shapes`](Self::into_shapes)
    /// on feature lists.
    pub fn into_features(self) -> Self {
        match self {
            ActiveSelection::Shapes(paths) => {
                ActiveSelection::Features(paths.iter().map(Nesting::feature_slot).collect())
            }
            features => features,
        }
    }

    /// The selection as state-store keys for the features layer.
    pub fn to_refs(&self) -> Vec<ShapeRef> {
        match self {
            ActiveSelection::Features(slots) => {
                slots.iter().map(|&slot| ShapeRef::Feature(slot)).collect()
            }
            ActiveSelection::Shapes(paths) => {
                paths.iter().map(|path| ShapeRef::Shape(path.clone())).collect()
            }
        }
    }
}

impl Default for ActiveSelection {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representation_toggle_is_an_involution_on_feature_lists() {
        let features = ActiveSelection::Features(vec![2, 0, 5]);
        let round_trip = features.clone().into_shapes().into_features();
        assert_eq!(round_trip, features);
    }

    #[test]
    fn shape_paths_collapse_to_their_slots() {
        let shapes = ActiveSelection::Shapes(vec![[3, 1].into(), [0, 0, 2].into()]);
        assert_eq!(
            shapes.into_features(),
            ActiveSelection::Features(vec![3, 0])
        );
    }
}
