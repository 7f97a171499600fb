//! Addressing over nested coordinate trees: flatten, rebuild, traverse.
//!
//! All five geometry kinds are handled by a single dispatch over the tag.
//! A nesting prefix (feature slot plus part/ring indices) always resolves
//! to exactly one flattenable position list. Resolution accepts the append
//! slot (`index == len`) so an in-progress extension can address a part or
//! ring that does not exist yet; anything past it is a contract violation.

use super::{Feature, Geometry, GeometryKind, Nesting, Position};
use crate::error::{GeometryError, Result};

/// Drops the duplicate closing position of a ring. Lines pass through.
pub fn open_positions(positions: &[Position], kind: GeometryKind) -> Vec<Position> {
    if kind.is_polygon_like() && positions.len() > 1 && positions.first() == positions.last() {
        positions[..positions.len() - 1].to_vec()
    } else {
        positions.to_vec()
    }
}

/// Re-appends the first position of a ring so it closes. Lines pass
/// through. Idempotent on already-closed rings.
pub fn close_positions(mut positions: Vec<Position>, kind: GeometryKind) -> Vec<Position> {
    if kind.is_polygon_like() && positions.len() > 1 && positions.first() != positions.last() {
        positions.push(positions[0]);
    }
    positions
}

fn check_head(feature: &Feature, prefix: &Nesting) -> Result<()> {
    if prefix.is_empty() || prefix.feature_slot() != feature.slot() {
        return Err(GeometryError::FeatureMismatch {
            expected: feature.slot(),
            found: if prefix.is_empty() {
                usize::MAX
            } else {
                prefix.feature_slot()
            },
        });
    }
    Ok(())
}

fn check_depth(kind: GeometryKind, suffix_len: usize) -> Result<()> {
    let expected = kind.shape_depth();
    if suffix_len > expected {
        return Err(GeometryError::NestingTooDeep {
            kind,
            depth: suffix_len,
        });
    }
    if suffix_len < expected {
        return Err(GeometryError::NestingTooShallow {
            kind,
            depth: suffix_len,
        });
    }
    Ok(())
}

/// Resolves `index` at `depth` against a level of `len` elements, allowing
/// the append slot.
fn check_index(index: usize, len: usize, depth: usize) -> Result<()> {
    if index > len {
        return Err(GeometryError::IndexOutOfRange { index, len, depth });
    }
    Ok(())
}

/// Returns the open position list of the ring/line addressed by `prefix`.
///
/// The append slot resolves to an empty list so callers can extend a
/// feature with a new part or ring through the same path arithmetic.
pub fn flatten(feature: &Feature, prefix: &Nesting) -> Result<Vec<Position>> {
    check_head(feature, prefix)?;
    let kind = feature.kind();
    check_depth(kind, prefix.len() - 1)?;

    match &feature.geometry {
        Geometry::Point(position) => Ok(vec![*position]),
        Geometry::LineString(positions) => Ok(positions.clone()),
        Geometry::Polygon(rings) => {
            let ring = prefix[1];
            check_index(ring, rings.len(), 1)?;
            Ok(rings
                .get(ring)
                .map(|r| open_positions(r, kind))
                .unwrap_or_default())
        }
        Geometry::MultiLineString(parts) => {
            let part = prefix[1];
            check_index(part, parts.len(), 1)?;
            Ok(parts.get(part).cloned().unwrap_or_default())
        }
        Geometry::MultiPolygon(parts) => {
            let (part, ring) = (prefix[1], prefix[2]);
            check_index(part, parts.len(), 1)?;
            match parts.get(part) {
                Some(rings) => {
                    check_index(ring, rings.len(), 2)?;
                    Ok(rings
                        .get(ring)
                        .map(|r| open_positions(r, kind))
                        .unwrap_or_default())
                }
                None => {
                    // New part: only ring 0 can be addressed under it.
                    check_index(ring, 0, 2)?;
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Replaces exactly the shape addressed by `prefix` with `positions`,
/// re-closing rings when the kind requires closure and leaving every other
/// part untouched. The append slot creates the part/ring.
pub fn rebuild(feature: &Feature, prefix: &Nesting, positions: Vec<Position>) -> Result<Feature> {
    check_head(feature, prefix)?;
    let kind = feature.kind();
    check_depth(kind, prefix.len() - 1)?;
    let closed = close_positions(positions, kind);

    let geometry = match &feature.geometry {
        Geometry::Point(position) => Geometry::Point(closed.first().copied().unwrap_or(*position)),
        Geometry::LineString(_) => Geometry::LineString(closed),
        Geometry::Polygon(rings) => {
            let ring = prefix[1];
            check_index(ring, rings.len(), 1)?;
            let mut rings = rings.clone();
            if ring == rings.len() {
                rings.push(closed);
            } else {
                rings[ring] = closed;
            }
            Geometry::Polygon(rings)
        }
        Geometry::MultiLineString(parts) => {
            let part = prefix[1];
            check_index(part, parts.len(), 1)?;
            let mut parts = parts.clone();
            if part == parts.len() {
                parts.push(closed);
            } else {
                parts[part] = closed;
            }
            Geometry::MultiLineString(parts)
        }
        Geometry::MultiPolygon(parts) => {
            let (part, ring) = (prefix[1], prefix[2]);
            check_index(part, parts.len(), 1)?;
            let mut parts = parts.clone();
            if part == parts.len() {
                check_index(ring, 0, 2)?;
                parts.push(vec![closed]);
            } else {
                let rings = &mut parts[part];
                check_index(ring, rings.len(), 2)?;
                if ring == rings.len() {
                    rings.push(closed);
                } else {
                    rings[ring] = closed;
                }
            }
            Geometry::MultiPolygon(parts)
        }
    };

    Ok(Feature::new(feature.id, geometry, feature.props.clone()))
}

/// Visits every ring/line part of the feature with its raw (closed)
/// position list and absolute nesting prefix, uniformly across single and
/// multi variants.
pub fn traverse(feature: &Feature, mut visit: impl FnMut(&[Position], &Nesting)) {
    let head = Nesting::feature(feature.slot());
    match &feature.geometry {
        Geometry::Point(position) => visit(std::slice::from_ref(position), &head),
        Geometry::LineString(positions) => visit(positions, &head),
        Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
            for (i, shape) in rings.iter().enumerate() {
                visit(shape, &head.child(i));
            }
        }
        Geometry::MultiPolygon(parts) => {
            for (i, rings) in parts.iter().enumerate() {
                let part = head.child(i);
                for (j, ring) in rings.iter().enumerate() {
                    visit(ring, &part.child(j));
                }
            }
        }
    }
}

/// Rebuilds the feature by mapping every shape through `f`. A `None`
/// return keeps the shape as is; `Some` replaces its raw position list.
pub fn map_shapes(
    feature: &Feature,
    mut f: impl FnMut(&[Position], &Nesting) -> Option<Vec<Position>>,
) -> Feature {
    let head = Nesting::feature(feature.slot());
    let geometry = match &feature.geometry {
        Geometry::Point(position) => Geometry::Point(
            f(std::slice::from_ref(position), &head)
                .and_then(|p| p.first().copied())
                .unwrap_or(*position),
        ),
        Geometry::LineString(positions) => {
            Geometry::LineString(f(positions, &head).unwrap_or_else(|| positions.clone()))
        }
        Geometry::Polygon(rings) => Geometry::Polygon(
            rings
                .iter()
                .enumerate()
                .map(|(i, ring)| f(ring, &head.child(i)).unwrap_or_else(|| ring.clone()))
                .collect(),
        ),
        Geometry::MultiLineString(parts) => Geometry::MultiLineString(
            parts
                .iter()
                .enumerate()
                .map(|(i, part)| f(part, &head.child(i)).unwrap_or_else(|| part.clone()))
                .collect(),
        ),
        Geometry::MultiPolygon(parts) => Geometry::MultiPolygon(
            parts
                .iter()
                .enumerate()
                .map(|(i, rings)| {
                    let part = head.child(i);
                    rings
                        .iter()
                        .enumerate()
                        .map(|(j, ring)| f(ring, &part.child(j)).unwrap_or_else(|| ring.clone()))
                        .collect()
                })
                .collect(),
        ),
    };
    Feature::new(feature.id, geometry, feature.props.clone())
}

/// Promotes a single-part feature to its multi variant when a nesting
/// suffix of `suffix_len` indices implies one: a LineString addressed with
/// a part index becomes a MultiLineString, a Polygon addressed with a part
/// and ring index becomes a MultiPolygon. Coordinates are wrapped one
/// level, so existing vertex addressing survives as index arithmetic.
pub fn promote_for(feature: &Feature, suffix_len: usize) -> Feature {
    let geometry = match (&feature.geometry, suffix_len) {
        (Geometry::LineString(positions), 1) => Geometry::MultiLineString(vec![positions.clone()]),
        (Geometry::Polygon(rings), 2) => Geometry::MultiPolygon(vec![rings.clone()]),
        _ => return feature.clone(),
    };
    Feature::new(feature.id, geometry, feature.props.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Props;

    fn square(id: u64) -> Feature {
        Feature::new(
            id,
            Geometry::Polygon(vec![vec![
                Position::new(0.0, 0.0),
                Position::new(4.0, 0.0),
                Position::new(4.0, 4.0),
                Position::new(0.0, 4.0),
                Position::new(0.0, 0.0),
            ]]),
            Props::new(),
        )
    }

    #[test]
    fn flatten_opens_rings() {
        let feature = square(3);
        let positions = flatten(&feature, &[2, 0].into()).unwrap();
        assert_eq!(positions.len(), 4);
        assert_ne!(positions.first(), positions.last());
    }

    #[test]
    fn rebuild_round_trips() {
        let feature = square(3);
        let prefix: Nesting = [2, 0].into();
        let positions = flatten(&feature, &prefix).unwrap();
        let rebuilt = rebuild(&feature, &prefix, positions).unwrap();
        assert_eq!(rebuilt, feature);
    }

    #[test]
    fn append_slot_creates_a_ring() {
        let feature = square(1);
        let hole = vec![
            Position::new(1.0, 1.0),
            Position::new(2.0, 1.0),
            Position::new(1.0, 2.0),
        ];
        assert_eq!(flatten(&feature, &[0, 1].into()).unwrap(), Vec::new());
        let rebuilt = rebuild(&feature, &[0, 1].into(), hole).unwrap();
        match &rebuilt.geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[1].first(), rings[1].last());
                assert_eq!(rings[1].len(), 4);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_is_fatal() {
        let feature = square(1);
        assert!(matches!(
            flatten(&feature, &[0, 2].into()),
            Err(GeometryError::IndexOutOfRange { index: 2, .. })
        ));
        assert!(matches!(
            flatten(&feature, &[1, 0].into()),
            Err(GeometryError::FeatureMismatch { .. })
        ));
        assert!(matches!(
            flatten(&feature, &[0, 0, 0].into()),
            Err(GeometryError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn promotion_wraps_one_level() {
        let line = Feature::new(
            2,
            Geometry::LineString(vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0)]),
            Props::new(),
        );
        let promoted = promote_for(&line, 1);
        match &promoted.geometry {
            Geometry::MultiLineString(parts) => {
                assert_eq!(parts.len(), 1);
                assert_eq!(parts[0].len(), 2);
            }
            other => panic!("expected multi line, got {other:?}"),
        }
        // The original vertex path [1, 0] maps to [1, 0, 0] by arithmetic.
        assert_eq!(
            flatten(&promoted, &[1, 0].into()).unwrap()[0],
            Position::new(0.0, 0.0)
        );
    }
}
