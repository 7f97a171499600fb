//! The editor hub: feature sequence, state store, and host handle.
//!
//! Tools borrow the editor mutably per event; the hub itself never decides
//! protocol, it only keeps the shared pieces consistent and forwards render
//! calls.

use mapscribe_core::{
    ActiveSelection, EntityState, Feature, Nesting, ShapeRef, StateStore, Vertex,
};

use crate::host::{Cursor, Host, RenderUpdate, StateFlags};

/// A node pick without its derived position: the pen tool's finish and
/// starting candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub fid: u64,
    pub indices: Nesting,
}

/// Owns the features being edited, the selection state store, and the
/// handle to the rendering host.
pub struct Editor {
    features: Vec<Feature>,
    state: StateStore,
    host: Box<dyn Host>,
    selected: Vec<u64>,
    selected_nodes: Vec<NodeRef>,
}

impl Editor {
    pub fn new(host: Box<dyn Host>) -> Self {
        Self {
            features: Vec::new(),
            state: StateStore::new(),
            host,
            selected: Vec::new(),
            selected_nodes: Vec::new(),
        }
    }

    pub fn with_features(host: Box<dyn Host>, features: Vec<Feature>) -> Self {
        let mut editor = Self::new(host);
        editor.features = features;
        editor
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Replaces the committed feature sequence and reflects it into the
    /// host. Every commit goes through here or
    /// [`replace_feature`](Self::replace_feature); features are replaced
    /// whole, never aliased.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
        self.host
            .render(RenderUpdate::Features(self.features.clone()));
    }

    pub fn feature(&self, slot: usize) -> Option<&Feature> {
        self.features.get(slot)
    }

    pub fn feature_by_id(&self, id: u64) -> Option<&Feature> {
        self.features.get((id as usize).checked_sub(1)?)
    }

    /// Replaces the feature at `slot`, or appends when `slot` is the next
    /// free one (a pen commit for a brand-new feature).
    pub fn replace_feature(&mut self, slot: usize, feature: Feature) {
        if slot < self.features.len() {
            self.features[slot] = feature;
        } else if slot == self.features.len() {
            self.features.push(feature);
        } else {
            tracing::warn!(slot, len = self.features.len(), "commit past append slot dropped");
            return;
        }
        self.host
            .render(RenderUpdate::Features(self.features.clone()));
    }

    /// The id the next committed feature will take.
    pub fn next_feature_id(&self) -> u64 {
        self.features.len() as u64 + 1
    }

    /// Current feature-level picks (1-based ids), independent of any
    /// in-shape active nesting state.
    pub fn selected(&self) -> &[u64] {
        &self.selected
    }

    pub fn set_selected(&mut self, ids: Vec<u64>) {
        for id in &self.selected {
            if !ids.contains(id) {
                self.host.set_feature_state(*id, StateFlags::selected(false));
            }
        }
        for id in &ids {
            if !self.selected.contains(id) {
                self.host.set_feature_state(*id, StateFlags::selected(true));
            }
        }
        self.selected = ids;
    }

    pub fn selected_features(&self) -> Vec<&Feature> {
        self.selected
            .iter()
            .filter_map(|&id| self.feature_by_id(id))
            .collect()
    }

    /// Node-level picks the pen tool keeps clickable.
    pub fn selected_nodes(&self) -> &[NodeRef] {
        &self.selected_nodes
    }

    pub fn set_selected_nodes(&mut self, nodes: Vec<NodeRef>) {
        self.selected_nodes = nodes;
    }

    pub fn is_node_selected(&self, fid: u64, indices: &Nesting) -> bool {
        self.selected_nodes
            .iter()
            .any(|n| n.fid == fid && &n.indices == indices)
    }

    /// The active selection value derived from the features layer of the
    /// store. The store never holds a mixed representation.
    pub fn active_selection(&self) -> ActiveSelection {
        let refs = self.state.features.get(EntityState::Active);
        if refs.iter().any(|r| matches!(r, ShapeRef::Shape(_))) {
            ActiveSelection::Shapes(refs.iter().map(ShapeRef::as_path).collect())
        } else {
            ActiveSelection::Features(refs.iter().map(ShapeRef::slot).collect())
        }
    }

    pub fn set_active_selection(&mut self, active: &ActiveSelection) {
        self.state
            .features
            .set(EntityState::Active, active.to_refs());
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    pub fn render(&mut self, update: RenderUpdate) {
        self.host.render(update);
    }

    pub fn render_features(&mut self) {
        self.host
            .render(RenderUpdate::Features(self.features.clone()));
    }

    pub fn render_points(&mut self, points: Vec<Vertex>) {
        self.host.render(RenderUpdate::Points(points));
    }

    pub fn set_cursor(&mut self, cursor: Cursor) -> Cursor {
        self.host.set_cursor(cursor)
    }

    pub fn set_feature_state(&mut self, id: u64, flags: StateFlags) {
        self.host.set_feature_state(id, flags);
    }

    pub fn set_node_state(&mut self, node: &NodeRef, flags: StateFlags) {
        self.host.set_node_state(node.fid, &node.indices, flags);
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("features", &self.features.len())
            .field("selected", &self.selected)
            .field("selected_nodes", &self.selected_nodes.len())
            .finish()
    }
}
