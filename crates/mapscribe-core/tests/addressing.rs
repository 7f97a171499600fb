//! Round-trip and closure properties of geometry addressing.

use mapscribe_core::{
    flatten, rebuild, traverse, Feature, Geometry, GeometryKind, Nesting, Position, Props,
};
use proptest::prelude::*;

fn pos(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

fn lake() -> Feature {
    Feature::new(
        1,
        Geometry::MultiPolygon(vec![
            vec![
                vec![
                    pos(0.0, 0.0),
                    pos(10.0, 0.0),
                    pos(10.0, 10.0),
                    pos(0.0, 10.0),
                    pos(0.0, 0.0),
                ],
                vec![pos(2.0, 2.0), pos(4.0, 2.0), pos(3.0, 4.0), pos(2.0, 2.0)],
            ],
            vec![vec![
                pos(20.0, 0.0),
                pos(24.0, 0.0),
                pos(22.0, 3.0),
                pos(20.0, 0.0),
            ]],
        ]),
        Props::new(),
    )
}

fn river() -> Feature {
    Feature::new(
        2,
        Geometry::MultiLineString(vec![
            vec![pos(0.0, 0.0), pos(1.0, 1.0), pos(2.0, 0.5)],
            vec![pos(5.0, 5.0), pos(6.0, 6.0)],
        ]),
        Props::new(),
    )
}

#[test]
fn rebuild_of_flatten_is_identity_on_every_shape() {
    for feature in [lake(), river()] {
        let mut prefixes = Vec::new();
        traverse(&feature, |_, prefix| prefixes.push(prefix.clone()));
        for prefix in prefixes {
            let positions = flatten(&feature, &prefix).expect("prefix from traverse resolves");
            let rebuilt = rebuild(&feature, &prefix, positions).expect("rebuild resolves");
            assert_eq!(rebuilt, feature, "round trip changed feature at {prefix}");
        }
    }
}

#[test]
fn rebuild_recloses_an_edited_ring() {
    let feature = lake();
    let prefix: Nesting = [0, 0, 1].into();
    let mut hole = flatten(&feature, &prefix).unwrap();
    hole[0] = pos(2.5, 2.5);
    let rebuilt = rebuild(&feature, &prefix, hole).unwrap();

    let Geometry::MultiPolygon(parts) = &rebuilt.geometry else {
        panic!("kind changed");
    };
    let ring = &parts[0][1];
    assert_eq!(ring.first(), ring.last(), "edited ring must stay closed");
    assert_eq!(ring[0], pos(2.5, 2.5));
    // Untouched shapes are untouched.
    assert_eq!(parts[1], {
        let Geometry::MultiPolygon(orig) = &feature.geometry else {
            unreachable!()
        };
        orig[1].clone()
    });
}

#[test]
fn line_parts_pass_through_unclosed() {
    let feature = river();
    let positions = flatten(&feature, &[1, 1].into()).unwrap();
    assert_eq!(positions.len(), 2);
    let rebuilt = rebuild(&feature, &[1, 1].into(), positions).unwrap();
    let Geometry::MultiLineString(parts) = &rebuilt.geometry else {
        panic!("kind changed");
    };
    assert_ne!(parts[1].first(), parts[1].last());
}

prop_compose! {
    fn open_ring()(raw in prop::collection::vec((-180.0f64..180.0, -85.0f64..85.0), 3..12)) -> Vec<Position> {
        raw.into_iter().map(|(x, y)| pos(x, y)).collect()
    }
}

proptest! {
    #[test]
    fn polygon_round_trip(ring in open_ring()) {
        let mut closed = ring.clone();
        closed.push(closed[0]);
        let feature = Feature::new(1, Geometry::Polygon(vec![closed]), Props::new());
        let prefix: Nesting = [0, 0].into();

        let flat = flatten(&feature, &prefix).unwrap();
        prop_assert_eq!(&flat, &ring, "flatten must open the ring");
        let rebuilt = rebuild(&feature, &prefix, flat).unwrap();
        prop_assert_eq!(rebuilt, feature);
    }

    #[test]
    fn line_round_trip(line in open_ring()) {
        let feature = Feature::new(3, Geometry::LineString(line), Props::new());
        let prefix: Nesting = [2].into();
        let flat = flatten(&feature, &prefix).unwrap();
        let rebuilt = rebuild(&feature, &prefix, flat).unwrap();
        prop_assert_eq!(rebuilt, feature);
    }

    #[test]
    fn rebuilt_rings_always_close(ring in open_ring()) {
        let feature = Feature::new(1, Geometry::Polygon(vec![]), Props::new());
        let rebuilt = rebuild(&feature, &[0, 0].into(), ring).unwrap();
        let Geometry::Polygon(rings) = &rebuilt.geometry else {
            panic!("kind changed");
        };
        prop_assert_eq!(rings[0].first(), rings[0].last());
    }
}

#[test]
fn traverse_is_uniform_across_variants() {
    let mut seen: Vec<(Nesting, usize)> = Vec::new();
    traverse(&lake(), |positions, prefix| {
        seen.push((prefix.clone(), positions.len()));
    });
    let expected: Vec<(Nesting, usize)> = vec![
        (Nesting::from([0, 0, 0]), 5),
        (Nesting::from([0, 0, 1]), 4),
        (Nesting::from([0, 1, 0]), 4),
    ];
    assert_eq!(seen, expected);

    let point = Feature::new(5, Geometry::Point(pos(1.0, 2.0)), Props::new());
    let mut seen: Vec<(Nesting, usize)> = Vec::new();
    traverse(&point, |positions, prefix| {
        seen.push((prefix.clone(), positions.len()));
    });
    assert_eq!(seen, vec![(Nesting::feature(4), 1)]);
}

#[test]
fn geometry_kind_floors() {
    assert_eq!(GeometryKind::Polygon.min_positions(), 3);
    assert_eq!(GeometryKind::LineString.min_positions(), 2);
    assert!(GeometryKind::MultiPolygon.is_polygon_like());
    assert!(!GeometryKind::MultiLineString.is_polygon_like());
}
