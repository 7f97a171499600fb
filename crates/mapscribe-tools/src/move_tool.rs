//! The move tool: hover, selection clicks, and shape/vertex drags.
//!
//! Handlers return `true` when they consume the event; the host pauses
//! camera interaction for consumed pointer-downs until release. A drag is
//! only recognized once the pointer leaves a small screen threshold, so a
//! mousedown on an already-selected shape can either start a drag or, on a
//! still pointer, apply the deferred selection release.

use mapscribe_core::{
    flatten, insertion_index, is_reducible, map_shapes, merge_on_close, middle_points,
    move_positions, rebuild, transition, vertex_points, ActiveSelection, EntityState, Feature,
    Nesting, Position, Props, ShapeRef, Vertex,
};

use crate::editor::Editor;
use crate::host::{Cursor, HitLayer, KeyModifier, Modifiers, RenderUpdate, SourceEvent};

/// Pixels of screen travel below which a pointer-down/up pair counts as a
/// click rather than a drag.
const CLICK_THRESHOLD_PX: f64 = 3.0;

/// How drilling from feature-level selection into shapes is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyMode {
    /// Never drill into shapes.
    Never,
    /// A plain click on the sole selected feature drills in.
    Always,
    /// Only a double click drills in.
    DoubleClick,
    /// Representation follows the held modifier key.
    Key(KeyModifier),
}

/// Predicate over a hit's nesting and props; hits it rejects are invisible
/// to the tool.
pub type HitFilter = Box<dyn Fn(&Nesting, &Props) -> bool>;

pub struct MoveToolConfig {
    pub modify: ModifyMode,
    pub filter: HitFilter,
}

impl Default for MoveToolConfig {
    fn default() -> Self {
        Self {
            modify: ModifyMode::Always,
            filter: Box::new(|_, _| true),
        }
    }
}

struct ShapeDrag {
    origin: Position,
    origin_screen: (f64, f64),
    release: Option<ActiveSelection>,
    stored_hover: Vec<ShapeRef>,
    working: Option<Vec<Feature>>,
}

struct VertexDrag {
    origin: Position,
    anchor: Vertex,
    prefix: Nesting,
    /// Open positions of the dragged shape, including a vertex inserted
    /// from a midpoint handle.
    positions: Vec<Position>,
    feature: Feature,
    reducible: bool,
    sibling: Option<Vertex>,
    /// Neighbor index that keeps hover when the drag merges into it.
    before: Option<usize>,
    moved: bool,
}

enum DragState {
    Idle,
    Shape(ShapeDrag),
    Vertex(VertexDrag),
}

impl DragState {
    fn is_dragging(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// The move tool state machine. One instance per editor; all fields are
/// owned here, never process-wide.
pub struct MoveTool {
    config: MoveToolConfig,
    drag: DragState,
    last_event: Option<SourceEvent>,
    paused: bool,
    stored_cursor: Option<Cursor>,
    enabled: bool,
}

impl MoveTool {
    pub fn new(config: MoveToolConfig) -> Self {
        Self {
            config,
            drag: DragState::Idle,
            last_event: None,
            paused: false,
            stored_cursor: None,
            enabled: false,
        }
    }

    pub fn config(&self) -> &MoveToolConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn enable(&mut self, editor: &mut Editor) {
        self.paused = false;
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.stored_cursor = Some(editor.set_cursor(Cursor::Default));
        self.refresh(editor);
    }

    /// Disabling mid-drag is deferred until the drag completes so a
    /// half-committed geometry is never left behind.
    pub fn disable(&mut self, editor: &mut Editor) {
        if self.drag.is_dragging() {
            self.paused = true;
            return;
        }
        self.paused = false;
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.last_event = None;
        if let Some(cursor) = self.stored_cursor.take() {
            editor.set_cursor(cursor);
        }
    }

    pub fn refresh(&mut self, editor: &mut Editor) {
        editor.render_features();
        self.render_points(editor);
    }

    /// Renders the editable points for the current selection: vertices of
    /// focused shapes plus synthesized midpoints when a shape-level
    /// selection allows insertion. Feature-level selections show their
    /// vertices disabled.
    fn render_points(&self, editor: &mut Editor) {
        let active = editor.active_selection();
        let features = editor.features().to_vec();
        let points = vertex_points(&features, &active);

        if active.is_feature_level() {
            editor.state_mut().points.add(
                EntityState::Disabled,
                points.iter().map(|p| p.nesting.clone()),
            );
            editor.render_points(points);
            return;
        }

        let midpoints: Vec<Vertex> = middle_points(&features, &active)
            .into_iter()
            .filter(|p| (self.config.filter)(&p.nesting, &p.props))
            .collect();

        editor.state_mut().points.add(
            EntityState::Disabled,
            midpoints
                .iter()
                .chain(points.iter())
                .map(|p| p.nesting.clone()),
        );
        let editable: Vec<Nesting> = points
            .iter()
            .filter(|p| (self.config.filter)(&p.nesting, &p.props))
            .map(|p| p.nesting.clone())
            .collect();
        editor
            .state_mut()
            .points
            .remove(EntityState::Disabled, &editable);

        let mut collection = points;
        collection.extend(midpoints);
        editor.render_points(collection);
    }

    /// Pointer motion: hover recomputation while idle, live geometry while
    /// dragging.
    pub fn handle_pointer_move(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.drag {
            DragState::Idle => {
                self.feature_hover(editor, event);
                self.point_hover(editor, event);
                false
            }
            DragState::Shape(_) => {
                self.shape_drag_move(editor, event);
                true
            }
            DragState::Vertex(_) => {
                self.vertex_drag_move(editor, event);
                true
            }
        }
    }

    /// Pointer-down dispatch by originating layer. The host delivers one
    /// event per hit layer, points first.
    pub fn handle_pointer_down(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        match event.layer {
            Some(HitLayer::Points) => self.handle_point_down(editor, event),
            Some(HitLayer::Lines) | Some(HitLayer::Planes) => {
                self.handle_shape_down(editor, event)
            }
            None => false,
        }
    }

    fn feature_hover(&mut self, editor: &mut Editor, event: &SourceEvent) {
        self.last_event = Some(event.clone());
        let filter = &self.config.filter;
        let mut shapes: Vec<Nesting> = event
            .points
            .iter()
            .filter(|p| filter(&p.nesting, &p.props))
            .map(|p| p.nesting.clone())
            .chain(
                event
                    .lines
                    .iter()
                    .chain(event.planes.iter())
                    .filter(|h| filter(&h.nesting, &h.props))
                    .map(|h| h.nesting.clone()),
            )
            .collect();

        let active = editor.active_selection();
        if active.is_feature_level() {
            editor.set_cursor(if shapes.is_empty() {
                Cursor::Default
            } else {
                Cursor::Pointer
            });
            let hover = shapes
                .first()
                .map(|n| vec![ShapeRef::Feature(n.feature_slot())])
                .unwrap_or_default();
            editor.state_mut().features.set(EntityState::Hover, hover);
            return;
        }

        let slots = active.slots();
        shapes.retain(|n| slots.contains(&n.feature_slot()));
        match shapes.first() {
            Some(first) => {
                editor.set_cursor(Cursor::Pointer);
                editor
                    .state_mut()
                    .features
                    .set(EntityState::Hover, vec![ShapeRef::Shape(first.clone())]);
            }
            None => {
                editor.set_cursor(Cursor::Default);
                editor
                    .state_mut()
                    .features
                    .set(EntityState::Hover, Vec::new());
            }
        }
    }

    fn point_hover(&mut self, editor: &mut Editor, event: &SourceEvent) {
        if editor.active_selection().is_feature_level() {
            return;
        }
        let hover = event
            .points
            .iter()
            .find(|p| (self.config.filter)(&p.nesting, &p.props))
            .map(|p| vec![p.nesting.clone()])
            .unwrap_or_default();
        editor.state_mut().points.set(EntityState::Hover, hover);
    }

    /// Click on empty canvas: clears the selection unless the click landed
    /// on something the current selection still owns.
    pub fn handle_canvas_click(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled {
            return false;
        }
        if let ModifyMode::Key(key) = self.config.modify {
            if event.modifiers.holds(key) {
                return false;
            }
        }

        let hit_slots: Vec<usize> = event
            .points
            .iter()
            .map(|p| p.nesting.feature_slot())
            .chain(event.lines.iter().map(|h| h.nesting.feature_slot()))
            .chain(event.planes.iter().map(|h| h.nesting.feature_slot()))
            .collect();

        match editor.active_selection() {
            ActiveSelection::Features(slots) if !slots.is_empty() => {
                if !hit_slots.is_empty() {
                    return false;
                }
            }
            ActiveSelection::Features(_) => {}
            ActiveSelection::Shapes(paths) => {
                if paths.iter().any(|p| hit_slots.contains(&p.feature_slot())) {
                    return false;
                }
            }
        }

        editor
            .state_mut()
            .features
            .set(EntityState::Active, Vec::new());
        self.refresh(editor);
        self.feature_hover(editor, event);
        true
    }

    /// Mousedown on a line or plane: applies the selection transition and
    /// arms a whole-shape drag.
    pub fn handle_shape_down(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled || self.drag.is_dragging() {
            return false;
        }
        let active = editor.active_selection();
        let has_editable_points = event
            .points
            .iter()
            .any(|p| (self.config.filter)(&p.nesting, &p.props));
        if has_editable_points && !active.is_feature_level() {
            return false;
        }
        if event.layer == Some(HitLayer::Planes)
            && event
                .lines
                .iter()
                .any(|h| (self.config.filter)(&h.nesting, &h.props))
        {
            return false;
        }
        let nesting = match event.layer {
            Some(HitLayer::Lines) => event.lines.first().map(|h| h.nesting.clone()),
            Some(HitLayer::Planes) => event.planes.first().map(|h| h.nesting.clone()),
            _ => None,
        };
        let Some(nesting) = nesting else {
            return false;
        };

        let stored_hover = editor.state().features.get(EntityState::Hover).to_vec();
        let Some(step) = transition(
            event.modifiers.shift,
            &active,
            &nesting,
            self.config.modify == ModifyMode::Always,
        ) else {
            return false;
        };

        editor
            .state_mut()
            .features
            .set(EntityState::Active, step.active.to_refs());
        self.render_points(editor);
        self.drag = DragState::Shape(ShapeDrag {
            origin: event.position,
            origin_screen: event.screen_position,
            release: step.release,
            stored_hover,
            working: None,
        });
        true
    }

    fn shape_drag_move(&mut self, editor: &mut Editor, event: &SourceEvent) {
        let DragState::Shape(drag) = &mut self.drag else {
            return;
        };
        if drag.working.is_none() {
            let (dx, dy) = (
                (event.screen_position.0 - drag.origin_screen.0).abs(),
                (event.screen_position.1 - drag.origin_screen.1).abs(),
            );
            if dx <= CLICK_THRESHOLD_PX && dy <= CLICK_THRESHOLD_PX {
                return;
            }
        }

        let active = editor.active_selection();
        let refs = active.to_refs();
        let working: Vec<Feature> = editor
            .features()
            .iter()
            .map(|item| {
                let focused: Vec<&ShapeRef> =
                    refs.iter().filter(|r| r.slot() == item.slot()).collect();
                if focused.is_empty() {
                    return item.clone();
                }
                map_shapes(item, |positions, prefix| {
                    focused
                        .iter()
                        .any(|r| match r {
                            ShapeRef::Feature(_) => true,
                            ShapeRef::Shape(path) => prefix.starts_with(path),
                        })
                        .then(|| move_positions(positions, drag.origin, event.position))
                })
            })
            .collect();

        editor.render(RenderUpdate::Features(working.clone()));
        let points: Vec<Vertex> = vertex_points(&working, &active)
            .into_iter()
            .filter(|p| (self.config.filter)(&p.nesting, &p.props))
            .collect();
        editor.render_points(points);
        drag.working = Some(working);
    }

    /// Mousedown on an editable vertex (or midpoint handle): arms a vertex
    /// drag. Neighbors of the dragged vertex stay enabled as merge
    /// targets; every other handle is disabled for the duration.
    pub fn handle_point_down(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled || self.drag.is_dragging() {
            return false;
        }
        let active = editor.active_selection();
        if active.is_feature_level() {
            return false;
        }
        let Some(point) = event
            .points
            .iter()
            .find(|p| (self.config.filter)(&p.nesting, &p.props))
            .cloned()
        else {
            return false;
        };
        let slot = point.nesting.feature_slot();
        let Some(feature) = editor.feature(slot).cloned() else {
            return false;
        };

        let prefix = point.nesting.parent();
        let mut positions = match flatten(&feature, &prefix) {
            Ok(positions) => positions,
            Err(err) => {
                tracing::warn!(%err, nesting = %point.nesting, "vertex path no longer resolves");
                return false;
            }
        };
        if positions.is_empty() {
            return false;
        }

        let mut anchor = point;
        let mut working_feature = feature.clone();
        let mut moved = false;
        let mut index = anchor.nesting.last().unwrap_or(0);

        if index >= positions.len() {
            // A midpoint handle: the drag inserts a new vertex between its
            // flanking pair and commits even on a still release.
            index = insertion_index(index, positions.len());
            positions.insert(index, anchor.position);
            anchor.nesting = anchor.nesting.with_last(index);
            working_feature = match rebuild(&feature, &prefix, positions.clone()) {
                Ok(feature) => feature,
                Err(err) => {
                    tracing::warn!(%err, "midpoint insertion failed");
                    return false;
                }
            };
            moved = true;
        }

        let kind = feature.kind();
        let reducible = is_reducible(positions.len(), kind);
        let last = positions.len() - 1;
        let before = if reducible && index == 0 {
            kind.is_polygon_like().then_some(last)
        } else {
            index.checked_sub(1)
        };
        let after = if reducible && index == last {
            kind.is_polygon_like().then_some(0)
        } else {
            (index + 1 <= last).then_some(index + 1)
        };

        let points = vertex_points(std::slice::from_ref(&working_feature), &active);
        let (mut off, mut on) = (Vec::new(), Vec::new());
        for p in &points {
            let is_target = [before, after]
                .iter()
                .flatten()
                .any(|&n| p.nesting == prefix.child(n));
            if is_target {
                on.push(p.nesting.clone());
            } else {
                off.push(p.nesting.clone());
            }
        }
        editor.state_mut().points.add(EntityState::Disabled, off);
        editor.state_mut().points.remove(EntityState::Disabled, &on);
        editor.render_points(points);

        editor
            .state_mut()
            .points
            .set(EntityState::Hover, vec![anchor.nesting.clone()]);
        editor
            .state_mut()
            .points
            .set(EntityState::Active, vec![anchor.nesting.clone()]);

        self.drag = DragState::Vertex(VertexDrag {
            origin: event.position,
            anchor,
            prefix,
            positions,
            feature: working_feature,
            reducible,
            sibling: None,
            before,
            moved,
        });
        true
    }

    fn vertex_drag_move(&mut self, editor: &mut Editor, event: &SourceEvent) {
        let active = editor.active_selection();
        let DragState::Vertex(drag) = &mut self.drag else {
            return;
        };

        drag.sibling = event
            .points
            .iter()
            .find(|p| {
                p.nesting != drag.anchor.nesting
                    && !editor
                        .state()
                        .points
                        .contains(EntityState::Disabled, &p.nesting)
            })
            .cloned();

        let next = drag
            .sibling
            .as_ref()
            .map(|s| s.position)
            .unwrap_or_else(|| drag.anchor.position.translated(drag.origin, event.position));

        let index = drag.anchor.nesting.last().unwrap_or(0);
        let mut positions = drag.positions.clone();
        positions[index] = next;
        drag.feature = match rebuild(&drag.feature, &drag.prefix, positions) {
            Ok(feature) => feature,
            Err(err) => {
                tracing::warn!(%err, "vertex reposition failed");
                return;
            }
        };
        drag.moved = true;

        let mut working = editor.features().to_vec();
        let slot = drag.anchor.nesting.feature_slot();
        if slot < working.len() {
            working[slot] = drag.feature.clone();
        }
        editor.render(RenderUpdate::Features(working));
        editor.render_points(vertex_points(std::slice::from_ref(&drag.feature), &active));
    }

    /// Pointer release: commits drag geometry, or applies the deferred
    /// selection release when the pointer never left the click threshold.
    pub fn handle_pointer_up(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled && !self.drag.is_dragging() {
            return false;
        }
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Idle => false,
            DragState::Shape(drag) => {
                self.finish_shape_drag(editor, event, drag);
                true
            }
            DragState::Vertex(drag) => {
                self.finish_vertex_drag(editor, event, drag);
                true
            }
        }
    }

    fn finish_shape_drag(&mut self, editor: &mut Editor, event: &SourceEvent, drag: ShapeDrag) {
        if let Some(working) = drag.working {
            editor
                .state_mut()
                .features
                .set(EntityState::Hover, drag.stored_hover);
            editor.set_features(working);
        } else {
            if let Some(release) = drag.release {
                let refs = release.to_refs();
                editor
                    .state_mut()
                    .features
                    .set(EntityState::Hover, refs.clone());
                editor.state_mut().features.set(EntityState::Active, refs);
            }
            self.refresh(editor);
        }
        self.feature_hover(editor, event);
        if self.paused {
            self.disable(editor);
        }
    }

    fn finish_vertex_drag(&mut self, editor: &mut Editor, event: &SourceEvent, drag: VertexDrag) {
        editor
            .state_mut()
            .points
            .set(EntityState::Active, Vec::new());

        if drag.moved {
            let slot = drag.anchor.nesting.feature_slot();
            let index = drag.anchor.nesting.last().unwrap_or(0);
            let mut committed = drag.feature.clone();

            if let Some(sibling) = drag
                .sibling
                .as_ref()
                .filter(|s| (self.config.filter)(&s.nesting, &s.props))
            {
                let hover = if sibling.nesting.last() == drag.before {
                    sibling.nesting.clone()
                } else {
                    drag.anchor.nesting.clone()
                };
                editor
                    .state_mut()
                    .points
                    .set(EntityState::Hover, vec![hover]);

                // Released on a sibling of the same ring/line: merge by
                // deleting the dragged vertex, unless the floor refuses it
                // and the snap stays a plain move.
                if sibling.nesting.parent() == drag.prefix && drag.reducible {
                    if let Some(target) = sibling.nesting.last() {
                        if let Some(merged) = merge_on_close(
                            &drag.positions,
                            index,
                            target,
                            drag.feature.kind(),
                        ) {
                            match rebuild(&drag.feature, &drag.prefix, merged) {
                                Ok(feature) => committed = feature,
                                Err(err) => {
                                    tracing::warn!(%err, "merge rebuild failed, keeping move");
                                }
                            }
                        }
                    }
                }
            }
            editor.replace_feature(slot, committed);
        }

        self.render_points(editor);
        self.handle_key(editor, event.modifiers);
        self.feature_hover(editor, event);
        if self.paused {
            self.disable(editor);
        }
    }

    /// Double click drills a feature into shape-level selection when the
    /// tool is configured for it.
    pub fn handle_double_click(&mut self, editor: &mut Editor, event: &SourceEvent) -> bool {
        if !self.enabled || self.config.modify != ModifyMode::DoubleClick {
            return false;
        }
        let active = editor.active_selection();
        let has_editable_points = event
            .points
            .iter()
            .any(|p| (self.config.filter)(&p.nesting, &p.props));
        if has_editable_points && !active.is_feature_level() {
            return false;
        }
        if event.layer == Some(HitLayer::Planes)
            && event
                .lines
                .iter()
                .any(|h| (self.config.filter)(&h.nesting, &h.props))
        {
            return false;
        }
        let nesting = match event.layer {
            Some(HitLayer::Lines) => event.lines.first().map(|h| h.nesting.clone()),
            Some(HitLayer::Planes) => event.planes.first().map(|h| h.nesting.clone()),
            _ => None,
        };
        let Some(nesting) = nesting else {
            return false;
        };
        editor.state_mut().features.set(
            EntityState::Active,
            vec![ShapeRef::Shape(Nesting::feature(nesting.feature_slot()))],
        );
        self.refresh(editor);
        true
    }

    /// Modifier-key edge: converts the selection representation without
    /// touching geometry. The release edge is ignored mid-drag.
    pub fn handle_key(&mut self, editor: &mut Editor, modifiers: Modifiers) {
        if !self.enabled {
            return;
        }
        let ModifyMode::Key(key) = self.config.modify else {
            return;
        };

        if !modifiers.holds(key) {
            if !self.drag.is_dragging() {
                let features = editor.active_selection().into_features();
                editor.set_active_selection(&features);
                editor
                    .state_mut()
                    .points
                    .set(EntityState::Active, Vec::new());
                editor
                    .state_mut()
                    .points
                    .set(EntityState::Hover, Vec::new());
                self.refresh(editor);
                if let Some(event) = self.last_event.clone() {
                    self.feature_hover(editor, &event);
                }
            }
            return;
        }

        let shapes = editor.active_selection().into_shapes();
        editor.set_active_selection(&shapes);
        self.refresh(editor);
        if let Some(event) = self.last_event.clone() {
            self.feature_hover(editor, &event);
        }
    }

    /// Pointer left the canvas: drop feature hover.
    pub fn handle_canvas_leave(&mut self, editor: &mut Editor) {
        if !self.enabled {
            return;
        }
        editor
            .state_mut()
            .features
            .set(EntityState::Hover, Vec::new());
    }
}

impl Default for MoveTool {
    fn default() -> Self {
        Self::new(MoveToolConfig::default())
    }
}
