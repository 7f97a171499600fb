//! Geometry model: positions, the tagged geometry union, and features.

use serde::{Deserialize, Serialize};

mod addressing;
mod nesting;

pub use addressing::{
    close_positions, flatten, map_shapes, open_positions, promote_for, rebuild, traverse,
};
pub use nesting::Nesting;

/// Arbitrary host-defined properties carried by a feature and mirrored onto
/// the vertices derived from it.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// A map-space coordinate. Immutable value; editing produces new positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translates by the delta between two reference positions.
    pub fn translated(&self, from: Position, to: Position) -> Position {
        Position::new(self.x + (to.x - from.x), self.y + (to.y - from.y))
    }

    /// Geometric midpoint of two positions.
    pub fn midpoint(a: Position, b: Position) -> Position {
        Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The bare tag of a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    /// Polygon-like kinds close their innermost rings (first == last).
    pub fn is_polygon_like(&self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::MultiPolygon)
    }

    /// Number of indices past the feature slot needed to address one
    /// flattenable shape (ring or line part) of this kind.
    pub fn shape_depth(&self) -> usize {
        match self {
            GeometryKind::Point | GeometryKind::LineString => 0,
            GeometryKind::Polygon | GeometryKind::MultiLineString => 1,
            GeometryKind::MultiPolygon => 2,
        }
    }

    /// Minimum open positions a shape of this kind may hold: 3 for a ring,
    /// 2 for a line.
    pub fn min_positions(&self) -> usize {
        if self.is_polygon_like() {
            3
        } else {
            2
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
        };
        write!(f, "{name}")
    }
}

/// Coordinate tree of a feature, nested per geometry kind. All editing goes
/// through the addressing functions in this module rather than matching on
/// the variants at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }
}

/// An editable feature. Features live in an ordered sequence owned by the
/// editor; `id` is the 1-based slot-derived identity (`id = slot + 1`),
/// while nesting paths store the 0-based slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u64,
    pub geometry: Geometry,
    #[serde(default)]
    pub props: Props,
}

impl Feature {
    pub fn new(id: u64, geometry: Geometry, props: Props) -> Self {
        Self {
            id,
            geometry,
            props,
        }
    }

    /// 0-based slot in the feature sequence, derived from the id.
    pub fn slot(&self) -> usize {
        (self.id as usize).saturating_sub(1)
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }
}

/// A renderable vertex handle on the points layer. `nesting` is absolute
/// (leads with the feature slot). Derived per render request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub nesting: Nesting,
    pub position: Position,
    #[serde(default)]
    pub props: Props,
}

/// A draw-session node on the nodes layer: endpoint and finish candidates
/// for the pen tool. `indices` is the path suffix within the owning
/// feature. Derived per render request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub fid: u64,
    pub indices: Nesting,
    pub position: Position,
    #[serde(default)]
    pub props: Props,
}
