//! The click transition over the active selection.
//!
//! Pure: no store access, no geometry. The move tool applies the returned
//! `active` at pointer-down and the deferred `release` only when pointer-up
//! resolves as a click, so a mousedown on an already-selected shape can
//! start a drag without collapsing a multi-selection prematurely.

use crate::geometry::Nesting;
use crate::selection::ActiveSelection;

/// Result of a click against the current selection. `release` is plain
/// data: the selection to apply if the interaction turns out to be a
/// click, not a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTransition {
    pub active: ActiveSelection,
    pub release: Option<ActiveSelection>,
}

impl SelectionTransition {
    fn keep(active: ActiveSelection) -> Self {
        Self {
            active,
            release: None,
        }
    }

    fn deferred(active: ActiveSelection, release: ActiveSelection) -> Self {
        Self {
            active,
            release: Some(release),
        }
    }
}

/// Decides the next selection for a click on the shape at `nesting`.
///
/// Returns `None` when the click falls outside the current editing scope
/// (shape-level selection, clicked feature not among the selected shapes'
/// features) and must be ignored. `allow_feature_release` gates the
/// drill-in from a single feature selection into its clicked shape.
pub fn transition(
    shift: bool,
    active: &ActiveSelection,
    nesting: &Nesting,
    allow_feature_release: bool,
) -> Option<SelectionTransition> {
    let slot = nesting.feature_slot();

    if !shift {
        if let ActiveSelection::Features(slots) = active {
            // Single selected feature clicked again: keep it for the drag,
            // drill into the clicked shape on release.
            if allow_feature_release && slots.len() == 1 && slots[0] == slot {
                return Some(SelectionTransition::deferred(
                    active.clone(),
                    ActiveSelection::Shapes(vec![nesting.clone()]),
                ));
            }

            // Multi-selection containing the clicked feature: collapse to
            // it on release.
            if slots.contains(&slot) {
                return Some(SelectionTransition::deferred(
                    active.clone(),
                    ActiveSelection::Features(vec![slot]),
                ));
            }

            // Clicked feature not selected: replace the selection.
            return Some(SelectionTransition::keep(ActiveSelection::Features(vec![
                slot,
            ])));
        }

        let ActiveSelection::Shapes(paths) = active else {
            unreachable!()
        };
        if !paths.iter().any(|p| p.feature_slot() == slot) {
            return None;
        }
        if !paths.contains(nesting) {
            return Some(SelectionTransition::keep(ActiveSelection::Shapes(vec![
                nesting.clone(),
            ])));
        }
        if paths.len() > 1 {
            return Some(SelectionTransition::deferred(
                active.clone(),
                ActiveSelection::Shapes(vec![nesting.clone()]),
            ));
        }
        // Sole selected shape clicked again: drill up to its feature.
        return Some(SelectionTransition::deferred(
            active.clone(),
            ActiveSelection::Features(vec![slot]),
        ));
    }

    if let ActiveSelection::Features(slots) = active {
        if slots.contains(&slot) {
            if slots.len() == 1 {
                return Some(SelectionTransition::keep(active.clone()));
            }
            // Drop the clicked feature from the multi-selection on release.
            let remaining = slots.iter().copied().filter(|&s| s != slot).collect();
            return Some(SelectionTransition::deferred(
                active.clone(),
                ActiveSelection::Features(remaining),
            ));
        }

        let mut extended = slots.clone();
        extended.push(slot);
        return Some(SelectionTransition::keep(ActiveSelection::Features(
            extended,
        )));
    }

    let ActiveSelection::Shapes(paths) = active else {
        unreachable!()
    };
    if !paths.iter().any(|p| p.feature_slot() == slot) {
        return None;
    }
    if !paths.contains(nesting) {
        // Add the shape, evicting any entry that addresses the same shape
        // at a different depth.
        let mut extended: Vec<Nesting> = paths
            .iter()
            .filter(|p| !p.conflicts_with(nesting))
            .cloned()
            .collect();
        extended.push(nesting.clone());
        return Some(SelectionTransition::keep(ActiveSelection::Shapes(
            extended,
        )));
    }
    if paths.len() > 1 {
        let remaining = paths.iter().filter(|p| *p != nesting).cloned().collect();
        return Some(SelectionTransition::deferred(
            active.clone(),
            ActiveSelection::Shapes(remaining),
        ));
    }
    Some(SelectionTransition::keep(active.clone()))
}
