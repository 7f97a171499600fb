//! Selection state store: per-layer hover/active/disabled sets.
//!
//! `LayerStates` is responsible for:
//! - Tracking which ids sit in each visual state slot
//! - Value-equality membership (nesting paths compare by content)
//! - Marking the layer dirty only when membership actually changes
//!
//! Hover and active are exclusive per id in practice (the tools enforce
//! it); disabled is tracked independently, so a vertex can be disabled
//! while the drag that disabled it is still in flight.

use crate::geometry::Nesting;
use crate::selection::ShapeRef;

/// A visual state slot. When one entity qualifies for several states at
/// once, paint consumers draw in ascending [`paint_rank`](EntityState::paint_rank)
/// order so the higher-precedence state lands on top:
/// active over hover over disabled over default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    Active,
    Hover,
    Disabled,
}

impl EntityState {
    /// Draw order: lower ranks first, higher precedence drawn on top.
    pub fn paint_rank(&self) -> u8 {
        match self {
            EntityState::Disabled => 0,
            EntityState::Hover => 1,
            EntityState::Active => 2,
        }
    }
}

/// State sets for one addressable layer, keyed by `K`.
#[derive(Debug, Clone)]
pub struct LayerStates<K> {
    active: Vec<K>,
    hover: Vec<K>,
    disabled: Vec<K>,
    dirty: bool,
}

impl<K> Default for LayerStates<K> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            hover: Vec::new(),
            disabled: Vec::new(),
            dirty: false,
        }
    }
}

impl<K: PartialEq + Clone> LayerStates<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, state: EntityState) -> &Vec<K> {
        match state {
            EntityState::Active => &self.active,
            EntityState::Hover => &self.hover,
            EntityState::Disabled => &self.disabled,
        }
    }

    fn slot_mut(&mut self, state: EntityState) -> &mut Vec<K> {
        match state {
            EntityState::Active => &mut self.active,
            EntityState::Hover => &mut self.hover,
            EntityState::Disabled => &mut self.disabled,
        }
    }

    /// The ids currently in `state`.
    pub fn get(&self, state: EntityState) -> &[K] {
        self.slot(state)
    }

    /// The states `id` currently sits in.
    pub fn states_of(&self, id: &K) -> Vec<EntityState> {
        let mut states = Vec::new();
        for state in [EntityState::Active, EntityState::Hover, EntityState::Disabled] {
            if self.slot(state).contains(id) {
                states.push(state);
            }
        }
        states
    }

    pub fn contains(&self, state: EntityState, id: &K) -> bool {
        self.slot(state).contains(id)
    }

    /// Replaces the membership of `state`. A call that changes nothing is
    /// a no-op and does not dirty the layer.
    pub fn set(&mut self, state: EntityState, ids: Vec<K>) {
        if *self.slot(state) == ids {
            return;
        }
        *self.slot_mut(state) = ids;
        self.dirty = true;
    }

    /// Adds the ids not already present.
    pub fn add(&mut self, state: EntityState, ids: impl IntoIterator<Item = K>) {
        let mut changed = false;
        for id in ids {
            let slot = self.slot_mut(state);
            if !slot.contains(&id) {
                slot.push(id);
                changed = true;
            }
        }
        if changed {
            self.dirty = true;
        }
    }

    /// Removes the ids that are present.
    pub fn remove(&mut self, state: EntityState, ids: &[K]) {
        let slot = self.slot_mut(state);
        let before = slot.len();
        slot.retain(|id| !ids.contains(id));
        if slot.len() != before {
            self.dirty = true;
        }
    }

    /// Clears every state slot.
    pub fn clear(&mut self) {
        self.set(EntityState::Active, Vec::new());
        self.set(EntityState::Hover, Vec::new());
        self.set(EntityState::Disabled, Vec::new());
    }

    /// Takes the dirty flag for the render tick; the sink coalesces any
    /// number of mutations within a handler into one repaint.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// The store for both addressable entity classes. Selection and hover sets
/// are owned here and reset at tool enable/disable boundaries.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    pub features: LayerStates<ShapeRef>,
    pub points: LayerStates<Nesting>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.features.clear();
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_set_does_not_dirty() {
        let mut layer: LayerStates<Nesting> = LayerStates::new();
        layer.set(EntityState::Hover, vec![[1, 0].into()]);
        assert!(layer.take_dirty());
        layer.set(EntityState::Hover, vec![[1, 0].into()]);
        assert!(!layer.is_dirty());
        layer.remove(EntityState::Hover, &[[2, 0].into()]);
        assert!(!layer.is_dirty());
    }

    #[test]
    fn disabled_tracks_independently() {
        let mut layer: LayerStates<Nesting> = LayerStates::new();
        let id: Nesting = [0, 2].into();
        layer.add(EntityState::Disabled, [id.clone()]);
        layer.add(EntityState::Hover, [id.clone()]);
        assert_eq!(
            layer.states_of(&id),
            vec![EntityState::Hover, EntityState::Disabled]
        );
        layer.set(EntityState::Hover, Vec::new());
        assert!(layer.contains(EntityState::Disabled, &id));
    }

    #[test]
    fn paint_precedence_orders_active_on_top() {
        assert!(EntityState::Active.paint_rank() > EntityState::Hover.paint_rank());
        assert!(EntityState::Hover.paint_rank() > EntityState::Disabled.paint_rank());
    }
}
