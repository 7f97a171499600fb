//! The full click-transition table, row by row, for both selection
//! representations.

use mapscribe_core::{transition, ActiveSelection, Nesting};

fn features(slots: &[usize]) -> ActiveSelection {
    ActiveSelection::Features(slots.to_vec())
}

fn shapes(paths: &[&[usize]]) -> ActiveSelection {
    ActiveSelection::Shapes(paths.iter().map(|p| Nesting::from(*p)).collect())
}

#[test]
fn feature_single_plain_click_defers_drill_in() {
    let result = transition(false, &features(&[3]), &[3, 1].into(), true).unwrap();
    assert_eq!(result.active, features(&[3]));
    assert_eq!(result.release, Some(shapes(&[&[3, 1]])));
}

#[test]
fn feature_single_plain_click_without_release_permission() {
    // allow_feature_release off: the single-feature case falls through to
    // the contains branch and defers a collapse instead.
    let result = transition(false, &features(&[3]), &[3, 1].into(), false).unwrap();
    assert_eq!(result.active, features(&[3]));
    assert_eq!(result.release, Some(features(&[3])));
}

#[test]
fn feature_multi_plain_click_defers_collapse() {
    let result = transition(false, &features(&[1, 3, 5]), &[3, 0].into(), true).unwrap();
    assert_eq!(result.active, features(&[1, 3, 5]));
    assert_eq!(result.release, Some(features(&[3])));
}

#[test]
fn feature_plain_click_outside_replaces() {
    let result = transition(false, &features(&[1, 3]), &[6, 0].into(), true).unwrap();
    assert_eq!(result.active, features(&[6]));
    assert!(result.release.is_none());
}

#[test]
fn feature_shift_click_on_sole_member_is_a_no_op() {
    let result = transition(true, &features(&[3]), &[3, 1].into(), true).unwrap();
    assert_eq!(result.active, features(&[3]));
    assert!(result.release.is_none());
}

#[test]
fn feature_shift_click_on_member_defers_removal() {
    let result = transition(true, &features(&[1, 3]), &[3, 0].into(), true).unwrap();
    assert_eq!(result.active, features(&[1, 3]));
    assert_eq!(result.release, Some(features(&[1])));
}

#[test]
fn feature_shift_click_outside_appends() {
    let result = transition(true, &features(&[1]), &[4, 0].into(), true).unwrap();
    assert_eq!(result.active, features(&[1, 4]));
    assert!(result.release.is_none());
}

#[test]
fn shape_click_outside_editing_scope_is_ignored() {
    for shift in [false, true] {
        assert!(
            transition(shift, &shapes(&[&[2, 0]]), &[7, 0].into(), true).is_none(),
            "shift={shift}: click outside scope must be ignored"
        );
    }
}

#[test]
fn shape_plain_click_on_unselected_shape_replaces() {
    let result = transition(false, &shapes(&[&[2, 0]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[2, 1]]));
    assert!(result.release.is_none());
}

#[test]
fn shape_shift_click_adds_and_evicts_prefix_conflicts() {
    // [2] and [2, 1] address the same shape tree at different depths; the
    // deeper click evicts the shallow entry.
    let result = transition(true, &shapes(&[&[2], &[4, 0]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[4, 0], &[2, 1]]));
    assert!(result.release.is_none());
}

#[test]
fn shape_plain_click_on_selected_multi_defers_collapse() {
    let result = transition(false, &shapes(&[&[2, 0], &[2, 1]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[2, 0], &[2, 1]]));
    assert_eq!(result.release, Some(shapes(&[&[2, 1]])));
}

#[test]
fn shape_shift_click_on_selected_multi_defers_removal() {
    let result = transition(true, &shapes(&[&[2, 0], &[2, 1]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[2, 0], &[2, 1]]));
    assert_eq!(result.release, Some(shapes(&[&[2, 0]])));
}

#[test]
fn shape_plain_click_on_sole_selected_defers_drill_up() {
    let result = transition(false, &shapes(&[&[2, 1]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[2, 1]]));
    assert_eq!(result.release, Some(features(&[2])));
}

#[test]
fn shape_shift_click_on_sole_selected_is_a_no_op() {
    let result = transition(true, &shapes(&[&[2, 1]]), &[2, 1].into(), true).unwrap();
    assert_eq!(result.active, shapes(&[&[2, 1]]));
    assert!(result.release.is_none());
}

#[test]
fn transition_is_idempotent_on_the_non_release_branch() {
    let cases = [
        (false, features(&[1]), Nesting::from([4, 0])),
        (true, features(&[1, 2]), Nesting::from([4, 0])),
        (false, shapes(&[&[2, 0]]), Nesting::from([2, 1])),
        (true, shapes(&[&[2, 0]]), Nesting::from([2, 1])),
    ];
    for (shift, active, nesting) in cases {
        let once = transition(shift, &active, &nesting, true).unwrap();
        let twice = transition(shift, &once.active, &nesting, true).unwrap();
        assert_eq!(
            twice.active, once.active,
            "shift={shift}: repeated click must settle"
        );
    }
}

#[test]
fn representation_toggle_round_trips() {
    let original = features(&[0, 4, 2]);
    assert_eq!(original.clone().into_shapes().into_features(), original);
    // And the shape form really is per-entry single-index paths.
    assert_eq!(
        features(&[0, 4]).into_shapes(),
        shapes(&[&[0], &[4]])
    );
}
