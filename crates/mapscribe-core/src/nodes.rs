//! Derived vertex and node collections.
//!
//! Nothing here is stored: every collection is recomputed from the feature
//! sequence on each render request, so paths stay consistent with the
//! current geometry generation. Features are matched against the selection
//! by their slot identity, so callers may pass the full sequence or just
//! the feature being edited.

use crate::geometry::{open_positions, traverse, Feature, Node, Position, Vertex};
use crate::selection::ActiveSelection;

/// Editable vertex handles for every shape covered by the selection. Open
/// positions only; the duplicate closing position of a ring never gets a
/// handle.
pub fn vertex_points(features: &[Feature], active: &ActiveSelection) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for feature in features {
        let scopes: Vec<_> = active
            .to_refs()
            .into_iter()
            .filter(|entry| entry.slot() == feature.slot())
            .map(|entry| entry.as_path())
            .collect();
        if scopes.is_empty() {
            continue;
        }
        traverse(feature, |positions, prefix| {
            if !scopes.iter().any(|scope| prefix.starts_with(scope)) {
                return;
            }
            let open = open_positions(positions, feature.kind());
            for (i, position) in open.iter().enumerate() {
                vertices.push(Vertex {
                    nesting: prefix.child(i),
                    position: *position,
                    props: feature.props.clone(),
                });
            }
        });
    }
    vertices
}

/// Synthesized midpoint handles between consecutive vertices of every
/// selected shape. Midpoint `k` is indexed past the open vertex count, so
/// dragging it resolves to an insertion via
/// [`insertion_index`](crate::ops::insertion_index).
pub fn middle_points(features: &[Feature], active: &ActiveSelection) -> Vec<Vertex> {
    let mut midpoints = Vec::new();
    for feature in features {
        let scopes: Vec<_> = active
            .to_refs()
            .into_iter()
            .filter(|entry| entry.slot() == feature.slot())
            .map(|entry| entry.as_path())
            .collect();
        if scopes.is_empty() {
            continue;
        }
        traverse(feature, |positions, prefix| {
            if !scopes.iter().any(|scope| prefix.starts_with(scope)) {
                return;
            }
            let start = open_positions(positions, feature.kind()).len();
            for (i, pair) in positions.windows(2).enumerate() {
                midpoints.push(Vertex {
                    nesting: prefix.child(start + i),
                    position: Position::midpoint(pair[0], pair[1]),
                    props: feature.props.clone(),
                });
            }
        });
    }
    midpoints
}

/// Draw-session nodes for every open vertex of the given features, with
/// suffix indices relative to the owning feature.
pub fn feature_nodes(features: &[&Feature]) -> Vec<Node> {
    let mut nodes = Vec::new();
    for feature in features {
        traverse(feature, |positions, prefix| {
            let open = open_positions(positions, feature.kind());
            for (i, position) in open.iter().enumerate() {
                nodes.push(Node {
                    fid: feature.id,
                    indices: prefix.suffix().child(i),
                    position: *position,
                    props: feature.props.clone(),
                });
            }
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Nesting, Props};

    fn ring_feature(id: u64) -> Feature {
        Feature::new(
            id,
            Geometry::Polygon(vec![vec![
                Position::new(0.0, 0.0),
                Position::new(2.0, 0.0),
                Position::new(2.0, 2.0),
                Position::new(0.0, 0.0),
            ]]),
            Props::new(),
        )
    }

    #[test]
    fn closing_duplicate_gets_no_handle() {
        let features = vec![ring_feature(1)];
        let vertices = vertex_points(&features, &ActiveSelection::Shapes(vec![[0, 0].into()]));
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].nesting, Nesting::from([0, 0, 2]));
    }

    #[test]
    fn slot_identity_survives_single_feature_slices() {
        // During a drag the tools pass only the working feature; its slot
        // comes from the id, not its position in the slice.
        let feature = ring_feature(3);
        let vertices = vertex_points(
            std::slice::from_ref(&feature),
            &ActiveSelection::Shapes(vec![[2, 0].into()]),
        );
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].nesting, Nesting::from([2, 0, 0]));
    }

    #[test]
    fn midpoints_cover_the_closing_edge() {
        let features = vec![ring_feature(1)];
        let midpoints = middle_points(&features, &ActiveSelection::Shapes(vec![[0, 0].into()]));
        // Three edges including the one back to the start, indexed past
        // the three open vertices.
        assert_eq!(midpoints.len(), 3);
        assert_eq!(midpoints[0].nesting, Nesting::from([0, 0, 3]));
        assert_eq!(midpoints[0].position, Position::new(1.0, 0.0));
        assert_eq!(midpoints[2].nesting, Nesting::from([0, 0, 5]));
    }

    #[test]
    fn feature_level_selection_covers_every_shape() {
        let features = vec![ring_feature(1), ring_feature(2)];
        let vertices = vertex_points(&features, &ActiveSelection::Features(vec![1]));
        assert_eq!(vertices.len(), 3);
        assert!(vertices.iter().all(|v| v.nesting.feature_slot() == 1));
    }

    #[test]
    fn nodes_carry_suffix_indices() {
        let feature = ring_feature(4);
        let nodes = feature_nodes(&[&feature]);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].fid, 4);
        assert_eq!(nodes[0].indices, Nesting::from([0, 0]));
    }
}
