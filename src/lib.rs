//! # Mapscribe
//!
//! An interactive vector-geometry editing core for map renderers: select,
//! move, and draw point/line/polygon features (including multi-part
//! variants) directly on a rendered map.
//!
//! ## Architecture
//!
//! Mapscribe is organized as a workspace with two crates:
//!
//! 1. **mapscribe-core** - Geometry model, nesting-path addressing, shape
//!    editing primitives, selection state store, and the click transition
//!    function
//! 2. **mapscribe-tools** - Host-facing interfaces, the editor hub, and
//!    the move/pen tool state machines
//!
//! The map engine itself stays outside: a host controller resolves pointer
//! events into [`SourceEvent`]s, forwards them to the tools, and
//! implements the [`Host`] trait to reflect render calls and paint flags
//! back into its layers.

pub use mapscribe_core as model;
pub use mapscribe_tools as tools;

pub use mapscribe_core::{
    close_positions, feature_nodes, flatten, insertion_index, is_reducible, map_shapes,
    merge_on_close, middle_points, move_positions, open_positions, promote_for, rebuild,
    transition, traverse, vertex_points, ActiveSelection, EntityState, Feature, Geometry,
    GeometryError, GeometryKind, LayerStates, Nesting, Node, Position, Props, Result,
    SelectionTransition, ShapeRef, StateStore, Vertex,
};

pub use mapscribe_tools::{
    Cursor, Editor, Hit, HitFilter, HitLayer, Host, KeyModifier, Modifiers, ModifyMode, MoveTool,
    MoveToolConfig, NoOpHost, NodeRef, PenTool, PenToolConfig, PenToolOptions, RenderUpdate,
    SourceEvent, StateFlags,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
