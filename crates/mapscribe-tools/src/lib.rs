//! # Mapscribe Tools
//!
//! The host-facing half of the editor: the event shape resolved by a map
//! controller, the render/state sink trait it implements, the editor hub
//! owning features and selection state, and the move/pen tool state
//! machines.
//!
//! ## Architecture
//!
//! ```text
//! Host controller (map engine, DOM wiring)
//!   ├── SourceEvent ─────────▶ MoveTool / PenTool handlers
//!   └── Host trait ◀────────── render calls, state flags, cursor
//!
//! Editor (hub)
//!   ├── Vec<Feature> (committed geometry)
//!   ├── StateStore (active/hover/disabled)
//!   └── selected / selected_nodes picks
//! ```
//!
//! Everything is single-threaded and event-driven: handlers run to
//! completion, render calls coalesce into the host's next frame tick, and
//! only one tool is expected to own input focus at a time.

pub mod editor;
pub mod host;
pub mod move_tool;
pub mod pen_tool;

pub use editor::{Editor, NodeRef};
pub use host::{
    Cursor, Hit, HitLayer, Host, KeyModifier, Modifiers, NoOpHost, RenderUpdate, SourceEvent,
    StateFlags,
};
pub use move_tool::{HitFilter, ModifyMode, MoveTool, MoveToolConfig};
pub use pen_tool::{PenTool, PenToolConfig, PenToolOptions};
