//! # Mapscribe Core
//!
//! Geometry addressing and selection state for an interactive vector
//! editor layered on a map renderer. This crate is the pure half of the
//! editor: no host events, no rendering, no tool orchestration.
//!
//! ## Core Components
//!
//! - **Geometry**: the tagged union of Point/LineString/Polygon and their
//!   multi variants, addressed by nesting paths
//! - **Addressing**: `flatten` / `rebuild` / `traverse` over the
//!   coordinate tree, with in-place promotion to multi variants
//! - **Editing primitives**: whole-shape moves, midpoint synthesis,
//!   drag-to-merge with the minimum-vertex floor
//! - **Selection**: the two-representation selection value, the state
//!   store, and the click transition function shared by the tools
//!
//! ## Architecture
//!
//! ```text
//! Feature sequence (ordered, slot-addressed)
//!   ├── Nesting paths (weak relations into coordinate trees)
//!   ├── Derived collections (vertices, midpoints, nodes)
//!   └── StateStore (active/hover/disabled per layer)
//!
//! transition() (pure click protocol)
//!   └── SelectionTransition { active, deferred release }
//! ```

pub mod error;
pub mod geometry;
pub mod nodes;
pub mod ops;
pub mod selection;
pub mod state;
pub mod transition;

pub use error::{GeometryError, Result};
pub use geometry::{
    close_positions, flatten, map_shapes, open_positions, promote_for, rebuild, traverse, Feature,
    Geometry, GeometryKind, Nesting, Node, Position, Props, Vertex,
};
pub use nodes::{feature_nodes, middle_points, vertex_points};
pub use ops::{insertion_index, is_reducible, merge_on_close, move_positions};
pub use selection::{ActiveSelection, ShapeRef};
pub use state::{EntityState, LayerStates, StateStore};
pub use transition::{transition, SelectionTransition};
