//! Pure shape-editing primitives used by the move and pen tools.

use crate::geometry::{GeometryKind, Position};

/// Translates every position by the delta between two reference points.
/// Used for whole-shape and whole-feature drags.
pub fn move_positions(positions: &[Position], from: Position, to: Position) -> Vec<Position> {
    positions.iter().map(|p| p.translated(from, to)).collect()
}

/// Whether a shape of `len` open positions can lose one more vertex
/// without crossing its floor (3 for a closed ring, 2 for an open line).
pub fn is_reducible(len: usize, kind: GeometryKind) -> bool {
    len > 2 + usize::from(kind.is_polygon_like())
}

/// Resolves a dragged vertex released on top of a sibling vertex of the
/// same ring/line: the dragged vertex is deleted so the shape re-closes
/// through the target. Returns `None` when the merge is refused (deletion
/// would cross the floor, or the target is not a distinct sibling vertex);
/// the caller then keeps the drag as a plain move.
pub fn merge_on_close(
    positions: &[Position],
    dragged: usize,
    target: usize,
    kind: GeometryKind,
) -> Option<Vec<Position>> {
    if dragged >= positions.len() || target >= positions.len() || dragged == target {
        return None;
    }
    if !is_reducible(positions.len(), kind) {
        return None;
    }
    let mut merged = positions.to_vec();
    merged.remove(dragged);
    Some(merged)
}

/// Maps an out-of-range drag index (a synthesized midpoint handle) to the
/// insertion slot that preserves ring ordering: midpoint `k` sits between
/// vertices `k - len` and `k - len + 1`, so the new vertex is inserted at
/// `index % len + 1` rather than appended past the end.
pub fn insertion_index(index: usize, len: usize) -> usize {
    index % len + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_square() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0),
            Position::new(4.0, 0.0),
            Position::new(4.0, 4.0),
            Position::new(0.0, 4.0),
        ]
    }

    #[test]
    fn move_translates_by_reference_delta() {
        let moved = move_positions(
            &open_square(),
            Position::new(0.0, 0.0),
            Position::new(1.0, -2.0),
        );
        assert_eq!(moved[2], Position::new(5.0, 2.0));
        assert_eq!(moved.len(), 4);
    }

    #[test]
    fn merge_refused_at_the_ring_floor() {
        let triangle = open_square()[..3].to_vec();
        assert!(merge_on_close(&triangle, 0, 1, GeometryKind::Polygon).is_none());
        assert!(merge_on_close(&open_square(), 0, 3, GeometryKind::Polygon).is_some());
    }

    #[test]
    fn merge_refused_at_the_line_floor() {
        let pair = open_square()[..2].to_vec();
        assert!(merge_on_close(&pair, 0, 1, GeometryKind::LineString).is_none());
        let triple = open_square()[..3].to_vec();
        assert_eq!(
            merge_on_close(&triple, 1, 0, GeometryKind::LineString)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn midpoint_handles_insert_in_ring_order() {
        // Four open vertices render midpoints 4..=7; each maps between its
        // flanking vertices.
        assert_eq!(insertion_index(4, 4), 1);
        assert_eq!(insertion_index(7, 4), 4);
    }
}
