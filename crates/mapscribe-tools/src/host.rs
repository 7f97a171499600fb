//! Host-facing interfaces: the event shape the controller resolves for the
//! tools and the sink trait the tools render through.
//!
//! The map engine, DOM wiring, and cursor-icon generation all live behind
//! [`Host`]. Render calls issued during one handler may be coalesced by
//! the sink into the next frame tick; the tools never assume an immediate
//! visual effect.

use serde::{Deserialize, Serialize};

use mapscribe_core::{Feature, Nesting, Node, Position, Props, Vertex};

/// A collection pushed at the host for one displayed layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderUpdate {
    Features(Vec<Feature>),
    Points(Vec<Vertex>),
    Nodes(Vec<Node>),
}

/// Partial per-entity paint flags, keyed the way the engine stores feature
/// state. `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateFlags {
    pub hover: Option<bool>,
    pub active: Option<bool>,
    pub disabled: Option<bool>,
    pub selected: Option<bool>,
}

impl StateFlags {
    pub fn hover(value: bool) -> Self {
        Self {
            hover: Some(value),
            ..Self::default()
        }
    }

    pub fn active(value: bool) -> Self {
        Self {
            active: Some(value),
            ..Self::default()
        }
    }

    pub fn selected(value: bool) -> Self {
        Self {
            selected: Some(value),
            ..Self::default()
        }
    }
}

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Crosshair,
}

/// The modifier key a tool can be configured to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyModifier {
    Alt,
    Meta,
    Ctrl,
}

/// Raw input modifiers carried on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub fn holds(&self, key: KeyModifier) -> bool {
        match key {
            KeyModifier::Alt => self.alt,
            KeyModifier::Meta => self.meta,
            KeyModifier::Ctrl => self.ctrl,
        }
    }
}

/// The addressable layer an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitLayer {
    Points,
    Lines,
    Planes,
}

/// A resolved hit on the lines or planes layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub nesting: Nesting,
    #[serde(default)]
    pub props: Props,
}

/// A pointer event with hits resolved per layer by the host controller.
/// `screen_position` is in pixels and only used for the click/drag
/// threshold; `position` is map space.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub position: Position,
    pub screen_position: (f64, f64),
    pub points: Vec<Vertex>,
    pub lines: Vec<Hit>,
    pub planes: Vec<Hit>,
    pub nodes: Vec<Node>,
    pub modifiers: Modifiers,
    pub layer: Option<HitLayer>,
}

impl SourceEvent {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            screen_position: (0.0, 0.0),
            points: Vec::new(),
            lines: Vec::new(),
            planes: Vec::new(),
            nodes: Vec::new(),
            modifiers: Modifiers::default(),
            layer: None,
        }
    }

    pub fn on_layer(mut self, layer: HitLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_screen(mut self, x: f64, y: f64) -> Self {
        self.screen_position = (x, y);
        self
    }

    pub fn with_points(mut self, points: Vec<Vertex>) -> Self {
        self.points = points;
        self
    }

    pub fn with_lines(mut self, lines: Vec<Hit>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_planes(mut self, planes: Vec<Hit>) -> Self {
        self.planes = planes;
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Everything the tools need from the rendering host. One implementation
/// per map engine; the editor owns a boxed instance.
pub trait Host {
    /// Reflects a collection into the displayed geometry of one layer.
    fn render(&mut self, update: RenderUpdate);

    /// Sets paint flags for a feature, keyed by its id.
    fn set_feature_state(&mut self, id: u64, flags: StateFlags);

    /// Sets paint flags for a draw-session node.
    fn set_node_state(&mut self, fid: u64, indices: &Nesting, flags: StateFlags);

    /// Sets the pointer cursor and returns the previous one so callers can
    /// restore it when they release the pointer surface.
    fn set_cursor(&mut self, cursor: Cursor) -> Cursor;
}

/// A host that renders nowhere. Useful for headless tests of the tool
/// protocols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHost {
    cursor: Cursor,
}

impl Host for NoOpHost {
    fn render(&mut self, _update: RenderUpdate) {}

    fn set_feature_state(&mut self, _id: u64, _flags: StateFlags) {}

    fn set_node_state(&mut self, _fid: u64, _indices: &Nesting, _flags: StateFlags) {}

    fn set_cursor(&mut self, cursor: Cursor) -> Cursor {
        std::mem::replace(&mut self.cursor, cursor)
    }
}
