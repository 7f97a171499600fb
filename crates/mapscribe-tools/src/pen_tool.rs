//! The pen tool: incremental draw and extend sessions.
//!
//! A session appends one position per click and keeps two finish
//! candidates highlighted: the ring-closing node at index 0 once the path
//! is polygon-eligible, and the current end. Clicking a candidate commits;
//! disabling the tool commits a path at or above its minimum vertex count
//! and discards one below it.

use mapscribe_core::{
    feature_nodes, flatten, promote_for, rebuild, Feature, Geometry, GeometryKind, Nesting,
    Position, Props,
};

use crate::editor::{Editor, NodeRef};
use crate::host::{Cursor, RenderUpdate, SourceEvent, StateFlags};

/// Runtime parameters exposed through [`PenTool::config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenToolConfig {
    pub types: Vec<GeometryKind>,
    pub is_drawing: bool,
}

/// Options accepted by [`PenTool::enable`].
#[derive(Debug, Clone, Default)]
pub struct PenToolOptions {
    /// Allowed target kinds; anything but LineString/Polygon is ignored,
    /// and an empty list allows both.
    pub types: Vec<GeometryKind>,
    /// Props stamped onto newly drawn features.
    pub props: Props,
}

/// The pen tool state machine. A `geometry` of `Some(vec![])` is a live
/// extension session with no clicks yet; `None` means no session.
pub struct PenTool {
    types: Vec<GeometryKind>,
    props: Props,
    geometry: Option<Vec<Position>>,
    indices: Nesting,
    reversed: bool,
    ignore_map_events: bool,
    stored_selected: Option<Vec<u64>>,
    stored_cursor: Option<Cursor>,
    hovered_node: Option<NodeRef>,
    pressed_node: Option<NodeRef>,
    enabled: bool,
}

impl PenTool {
    pub fn new() -> Self {
        Self {
            types: vec![GeometryKind::LineString, GeometryKind::Polygon],
            props: Props::new(),
            geometry: None,
            indices: Nesting::default(),
            reversed: false,
            ignore_map_events: false,
            stored_selected: None,
            stored_cursor: None,
            hovered_node: None,
            pressed_node: None,
            enabled: false,
        }
    }

    pub fn config(&self) -> PenToolConfig {
        PenToolConfig {
            types: self.types.clone(),
            is_drawing: self.geometry.is_some(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn line_allowed(&self) -> bool {
        self.types.contains(&GeometryKind::LineString)
    }

    /// Whether a merged path of `len` positions is still below the minimum
    /// for the allowed kinds: 2 when LineString is allowed, 3 otherwise.
    fn below_threshold(&self, len: usize) -> bool {
        usize::from(self.line_allowed()) + len < 3
    }

    /// The feature an extension session grows, promoted in place to its
    /// multi variant when the session indices imply one.
    fn target_feature(&self, editor: &Editor) -> Option<Feature> {
        let id = *editor.selected().first()?;
        let feature = editor.feature_by_id(id)?;
        Some(promote_for(feature, self.indices.len()))
    }

    /// Open positions of the session's anchor shape; empty for a part or
    /// ring that does not exist yet.
    fn anchor_positions(&self, feature: &Feature) -> Vec<Position> {
        let mut prefix = Nesting::feature(feature.slot());
        for index in self.indices.iter() {
            prefix.push(index);
        }
        match flatten(feature, &prefix) {
            Ok(positions) => positions,
            Err(err) => {
                tracing::warn!(%err, "session anchor no longer resolves");
                Vec::new()
            }
        }
    }

    /// The session path merged with its anchor shape. `as_render` keeps
    /// the anchor first and reverses it for a reversed session (live
    /// preview order); otherwise the clicked positions are reordered so
    /// the commit appends in topological order.
    fn session_geometry(
        &self,
        editor: &Editor,
        geometry: &[Position],
        as_render: bool,
    ) -> Vec<Position> {
        let mut anchor = self
            .target_feature(editor)
            .map(|f| self.anchor_positions(&f))
            .unwrap_or_default();
        if as_render {
            if self.reversed {
                anchor.reverse();
            }
            anchor.extend_from_slice(geometry);
            anchor
        } else if self.reversed {
            let mut merged: Vec<Position> = geometry.iter().rev().copied().collect();
            merged.extend(anchor);
            merged
        } else {
            anchor.extend_from_slice(geometry);
            anchor
        }
    }

    /// Builds the committed/previewed feature for the merged path,
    /// deciding the rendered kind: a polygon-capable path closes into a
    /// Polygon when it has three positions and either LineString is not
    /// allowed or the finishing node is the ring-closing candidate.
    fn build_feature(
        &self,
        editor: &Editor,
        feature: Option<Feature>,
        geometry: Vec<Position>,
        node: Option<&NodeRef>,
    ) -> Option<Feature> {
        let render_kind = match &feature {
            None => self.new_path_kind(geometry.len(), node),
            Some(f) if f.kind() == GeometryKind::LineString => {
                self.new_path_kind(geometry.len(), node)
            }
            Some(f) => f.kind(),
        };

        let indices = if render_kind != GeometryKind::LineString && self.indices.is_empty() {
            Nesting::from([0])
        } else {
            self.indices.clone()
        };

        let base = match feature {
            Some(f) => {
                let geometry = match (f.geometry, render_kind) {
                    (Geometry::LineString(positions), kind)
                        if kind != GeometryKind::LineString =>
                    {
                        Geometry::Polygon(vec![positions])
                    }
                    (geometry, _) => geometry,
                };
                Feature::new(f.id, geometry, f.props)
            }
            None => {
                let id = *editor.selected().first()?;
                let geometry = match render_kind {
                    GeometryKind::LineString => Geometry::LineString(Vec::new()),
                    _ => Geometry::Polygon(Vec::new()),
                };
                Feature::new(id, geometry, self.props.clone())
            }
        };

        let mut prefix = Nesting::feature(base.slot());
        for index in indices.iter() {
            prefix.push(index);
        }
        match rebuild(&base, &prefix, geometry) {
            Ok(feature) => Some(feature),
            Err(err) => {
                tracing::warn!(%err, "session commit does not resolve");
                None
            }
        }
    }

    fn new_path_kind(&self, len: usize, node: Option<&NodeRef>) -> GeometryKind {
        let closing = node.and_then(|n| n.indices.last()) == Some(0);
        if (self.line_allowed() || len < 3) && !closing {
            GeometryKind::LineString
        } else {
            GeometryKind::Polygon
        }
    }

    /// Renders the in-progress path, appending the hovered position for a
    /// live preview. Below the minimum the path renders as a placeholder
    /// line past the end of the committed sequence.
    fn render_preview(&self, editor: &mut Editor, next: Option<Position>) {
        let Some(selected) = editor.selected().first().copied() else {
            return;
        };
        let Some(geometry) = &self.geometry else {
            return;
        };

        let mut path = geometry.clone();
        if let Some(next) = next {
            path.push(next);
        }
        let merged = self.session_geometry(editor, &path, true);
        let feature = self.target_feature(editor);

        if self.below_threshold(merged.len()) {
            let props = feature.map(|f| f.props).unwrap_or_else(|| self.props.clone());
            let placeholder = Feature::new(
                editor.next_feature_id(),
                Geometry::LineString(merged),
                props,
            );
            let mut collection = editor.features().to_vec();
            if placeholder.slot() < collection.len() {
                collection[placeholder.slot()] = placeholder.clone();
            } else {
                collection.push(placeholder.clone());
            }
            editor.render(RenderUpdate::Features(collection));
            if next.is_none() {
                editor.render(RenderUpdate::Nodes(feature_nodes(&[&placeholder])));
            }
            return;
        }

        let Some(built) = self.build_feature(editor, feature, merged, None) else {
            return;
        };
        let slot = (selected as usize).saturating_sub(1);
        let mut collection = editor.features().to_vec();
        if slot < collection.len() {
            collection[slot] = built.clone();
        } else {
            collection.push(built.clone());
        }
        editor.render(RenderUpdate::Features(collection));
        if next.is_none() {
            editor.render(RenderUpdate::Nodes(feature_nodes(&[&built])));
        }
    }

    /// Recomputes the finish candidates: the ring-closing node at index 0
    /// for a polygon-capable path of three or more positions, plus the
    /// current end.
    fn activate_finish_nodes(&self, editor: &mut Editor) {
        let Some(geometry) = &self.geometry else {
            editor.set_selected_nodes(Vec::new());
            return;
        };
        let merged = self.session_geometry(editor, geometry, true);
        if self.below_threshold(merged.len()) {
            editor.set_selected_nodes(Vec::new());
            return;
        }
        let Some(fid) = editor.selected().first().copied() else {
            editor.set_selected_nodes(Vec::new());
            return;
        };

        let kinds = match self.target_feature(editor) {
            Some(f) if f.kind() != GeometryKind::LineString => vec![f.kind()],
            _ => self.types.clone(),
        };

        let mut nodes = Vec::new();
        if kinds.iter().any(GeometryKind::is_polygon_like) && merged.len() >= 3 {
            nodes.push(NodeRef {
                fid,
                indices: self.indices.child(0),
            });
        }
        nodes.push(NodeRef {
            fid,
            indices: self.indices.child(merged.len() - 1),
        });
        editor.set_selected_nodes(nodes);
    }

    /// Makes line endpoints clickable while no session is in progress, so
    /// a click can start an extension anchored there.
    fn activate_starting_nodes(&self, editor: &mut Editor, features: &[&Feature]) {
        let mut nodes = Vec::new();
        for feature in features {
            if !matches!(
                feature.kind(),
                GeometryKind::LineString | GeometryKind::MultiLineString
            ) {
                continue;
            }
            mapscribe_core::traverse(feature, |positions, prefix| {
                if positions.is_empty() {
                    return;
                }
                let suffix = prefix.suffix();
                nodes.push(NodeRef {
                    fid: feature.id,
                    indices: suffix.child(0),
                });
                nodes.push(NodeRef {
                    fid: feature.id,
                    indices: suffix.child(positions.len() - 1),
                });
            });
        }
        editor.set_selected_nodes(nodes);
    }

    fn reset_draw(&mut self, editor: &mut Editor) {
        self.reversed = false;
        self.geometry = None;
        self.indices = Nesting::default();
        editor.set_selected_nodes(Vec::new());
        editor.render_features();
        let selected: Vec<Feature> = editor.selected_features().into_iter().cloned().collect();
        let refs: Vec<&Feature> = selected.iter().collect();
        editor.render(RenderUpdate::Nodes(feature_nodes(&refs)));
    }

    pub fn refresh(&mut self, editor: &mut Editor) {
        editor.set_selected_nodes(Vec::new());
        editor.render_features();
        let selected: Vec<Feature> = editor.selected_features().into_iter().cloned().collect();
        let refs: Vec<&Feature> = selected.iter().collect();
        editor.render(RenderUpdate::Nodes(feature_nodes(&refs)));

        if editor.selected().is_empty() && self.geometry.is_some() {
            let id = editor.next_feature_id();
            editor.set_selected(vec![id]);
        } else {
            let features: Vec<Feature> =
                editor.selected_features().into_iter().cloned().collect();
            let refs: Vec<&Feature> = features.iter().collect();
            self.activate_starting_nodes(editor, &refs);
        }
        self.render_preview(editor, None);
    }

    pub fn enable(&mut self, editor: &mut Editor, options: PenToolOptions) {
        let types: Vec<GeometryKind> = options
            .types
            .into_iter()
            .filter(|t| matches!(t, GeometryKind::LineString | GeometryKind::Polygon))
            .collect();
        self.types = if types.is_empty() {
            vec![GeometryKind::LineString, GeometryKind::Polygon]
        } else {
            types
        };
        self.props = options.props;
        self.enabled = true;
        self.ignore_map_events = false;
        self.stored_cursor = Some(editor.set_cursor(Cursor::Crosshair));

        if editor.selected().len() > 1 {
            self.stored_selected = Some(editor.selected().to_vec());
            editor.set_selected(Vec::new());
        }
        self.reset_draw(editor);
        let features: Vec<Feature> = editor.selected_features().into_iter().cloned().collect();
        let refs: Vec<&Feature> = features.iter().collect();
        self.activate_starting_nodes(editor, &refs);
    }

    /// Commits an in-progress path at or above the minimum vertex count,
    /// discards one below it, and restores a selection stashed at enable.
    pub fn disable(&mut self, editor: &mut Editor) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.ignore_map_events = false;
        if let Some(cursor) = self.stored_cursor.take() {
            editor.set_cursor(cursor);
        }
        if let Some(stored) = self.stored_selected.take() {
            editor.set_selected(stored);
        }

        let Some(geometry) = self.geometry.take() else {
            return;
        };
        if geometry.is_empty() {
            self.indices = Nesting::default();
            self.reversed = false;
            return;
        }
        let merged = self.session_geometry(editor, &geometry, false);
        if self.below_threshold(merged.len()) {
            self.reset_draw(editor);
            return;
        }

        let target = self.target_feature(editor);
        let Some(selected) = editor.selected().first().copied() else {
            return;
        };
        if let Some(feature) = self.build_feature(editor, target, merged, None) {
            editor.replace_feature((selected as usize).saturating_sub(1), feature);
        }
        self.indices = Nesting::default();
        self.reversed = false;
        editor.set_selected_nodes(Vec::new());
    }

    /// Pointer motion: live preview of the hovered position, and cursor
    /// bookkeeping around highlighted nodes.
    pub fn handle_canvas_move(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let over_node = !event.nodes.is_empty();
        if !over_node {
            self.ignore_map_events = false;
        }
        editor.set_cursor(if over_node && self.ignore_map_events {
            Cursor::Pointer
        } else {
            Cursor::Crosshair
        });
        if self.ignore_map_events || self.geometry.is_none() {
            return false;
        }
        self.render_preview(editor, Some(event.position));
        true
    }

    /// Click on the canvas: appends a position to the session, or starts a
    /// new draw/extension session.
    pub fn handle_canvas_click(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled || self.ignore_map_events {
            return false;
        }

        if self.geometry.is_some() {
            if let Some(geometry) = self.geometry.as_mut() {
                geometry.push(event.position);
            }
            editor.set_selected_nodes(Vec::new());
            self.render_preview(editor, None);
            self.activate_finish_nodes(editor);

            if !editor.selected_nodes().is_empty() {
                // Hover the node just placed so a second click finishes.
                let merged =
                    self.session_geometry(editor, self.geometry.as_deref().unwrap_or(&[]), true);
                if let Some(fid) = editor.selected().first().copied() {
                    let end = NodeRef {
                        fid,
                        indices: self.indices.child(merged.len().saturating_sub(1)),
                    };
                    editor.set_node_state(&end, StateFlags::hover(true));
                }
                editor.set_cursor(Cursor::Pointer);
            }
            return true;
        }

        if event.modifiers.shift || event.modifiers.alt {
            return self.start_extension(editor, event);
        }

        let id = editor.next_feature_id();
        self.geometry = Some(vec![event.position]);
        self.indices = if self.line_allowed() {
            Nesting::default()
        } else {
            Nesting::from([0])
        };
        editor.set_selected_nodes(Vec::new());
        editor.set_selected(vec![id]);
        self.stored_selected = None;
        self.render_preview(editor, None);
        editor.set_feature_state(id, StateFlags::hover(true));
        true
    }

    /// Shift-click starts a new part/ring on the sole selected feature;
    /// alt-click starts an interior ring on a Polygon. Extending a
    /// MultiPolygon via alt is unsupported.
    fn start_extension(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if editor.selected().len() != 1 {
            return false;
        }
        let Some(feature) = self.target_feature(editor) else {
            return false;
        };

        if event.modifiers.shift {
            match &feature.geometry {
                Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
                    self.types = vec![GeometryKind::Polygon];
                    let part = match &feature.geometry {
                        Geometry::Polygon(_) => 1,
                        Geometry::MultiPolygon(parts) => parts.len(),
                        _ => unreachable!(),
                    };
                    self.indices = Nesting::from([part, 0]);
                }
                _ => {
                    self.types = vec![GeometryKind::LineString];
                    let part = match &feature.geometry {
                        Geometry::LineString(_) => 1,
                        Geometry::MultiLineString(parts) => parts.len(),
                        Geometry::Point(_) => return false,
                        _ => unreachable!(),
                    };
                    self.indices = Nesting::from([part]);
                }
            }
        } else if event.modifiers.alt {
            let Geometry::Polygon(rings) = &feature.geometry else {
                tracing::debug!(kind = %feature.kind(), "alt extension only supported on Polygon");
                return false;
            };
            self.types = vec![GeometryKind::Polygon];
            self.indices = Nesting::from([rings.len()]);
        }

        self.reversed = false;
        self.geometry = Some(vec![event.position]);
        self.render_preview(editor, None);
        editor.set_feature_state(feature.id, StateFlags::hover(true));
        true
    }

    /// Pointer entered a highlighted node: suppress canvas interaction and
    /// preview the close onto it.
    pub fn handle_point_enter(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(node) = event
            .nodes
            .iter()
            .find(|n| editor.is_node_selected(n.fid, &n.indices))
        else {
            return false;
        };
        self.ignore_map_events = true;
        let node_ref = NodeRef {
            fid: node.fid,
            indices: node.indices.clone(),
        };
        editor.set_node_state(&node_ref, StateFlags::hover(true));
        self.hovered_node = Some(node_ref);

        if self.geometry.is_some() {
            self.render_preview(editor, Some(node.position));
        }
        true
    }

    pub fn handle_point_leave(&mut self, editor: &mut Editor) {
        self.ignore_map_events = false;
        if let Some(node) = self.hovered_node.take() {
            editor.set_node_state(&node, StateFlags::hover(false));
        }
    }

    pub fn handle_point_down(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(node) = event
            .nodes
            .iter()
            .find(|n| editor.is_node_selected(n.fid, &n.indices))
        else {
            return false;
        };
        self.ignore_map_events = true;
        let node_ref = NodeRef {
            fid: node.fid,
            indices: node.indices.clone(),
        };
        editor.set_node_state(&node_ref, StateFlags::active(true));
        self.pressed_node = Some(node_ref);
        true
    }

    pub fn handle_pointer_up(&mut self, editor: &mut Editor) {
        if let Some(node) = self.pressed_node.take() {
            editor.set_node_state(&node, StateFlags::active(false));
        }
    }

    /// Click on a highlighted node: closes the session onto it and
    /// commits, or starts an extension anchored at a line endpoint.
    pub fn handle_point_click(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(node) = event
            .nodes
            .iter()
            .find(|n| editor.is_node_selected(n.fid, &n.indices))
            .cloned()
        else {
            return false;
        };
        let node_ref = NodeRef {
            fid: node.fid,
            indices: node.indices.clone(),
        };

        if let Some(geometry) = self.geometry.clone() {
            self.ignore_map_events = true;
            let merged = self.session_geometry(editor, &geometry, false);
            let target = self.target_feature(editor);
            let Some(selected) = editor.selected().first().copied() else {
                return false;
            };
            let Some(feature) = self.build_feature(editor, target, merged, Some(&node_ref)) else {
                return false;
            };
            editor.set_node_state(&node_ref, StateFlags::hover(false));
            self.reset_draw(editor);
            self.activate_starting_nodes(editor, &[&feature]);
            editor.replace_feature((selected as usize).saturating_sub(1), feature);
            return true;
        }

        // No session: start extending the clicked line from this endpoint.
        editor.set_node_state(&node_ref, StateFlags::hover(false));
        editor.set_selected_nodes(Vec::new());
        editor.set_selected(vec![node.fid]);
        self.stored_selected = None;
        self.geometry = Some(Vec::new());
        self.indices = node.indices.parent();
        self.reversed = node.indices.last() == Some(0);
        self.render_preview(editor, None);
        self.activate_finish_nodes(editor);
        true
    }

    pub fn handle_canvas_leave(&mut self, editor: &mut Editor) {
        if self.enabled && self.geometry.is_some() {
            self.render_preview(editor, None);
        }
    }
}

impl Default for PenTool {
    fn default() -> Self {
        Self::new()
    }
}
