use refscan::error::SearchError;
use refscan::selection::{ClickModifiers, Revert, Selection};

fn additive() -> ClickModifiers {
    ClickModifiers {
        additive: true,
        range: false,
    }
}

fn range() -> ClickModifiers {
    ClickModifiers {
        additive: false,
        range: true,
    }
}

#[test]
fn range_selection_is_symmetric() {
    let mut forward = Selection::new();
    forward.select(2);
    forward.click(7, range());

    let mut backward = Selection::new();
    backward.select(7);
    backward.click(2, range());

    let mut a: Vec<usize> = forward.iter().collect();
    let mut b: Vec<usize> = backward.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, vec![2, 3, 4, 5, 6, 7]);
    assert_eq!(a, b);
}

#[test]
fn trim_anchor_falls_back_to_nearest_lower_index() {
    let mut sel = Selection::new();
    sel.click(1, additive());
    sel.click(3, additive());
    sel.click(5, additive());
    assert_eq!(sel.anchor(), Some(5));

    sel.trim(0, 4);
    assert_eq!(sel.indices(), &[1, 3]);
    assert_eq!(sel.anchor(), Some(3));
}

#[test]
fn duplicate_then_delete_round_trips() {
    let mut items = vec!["a", "b", "c"];
    let mut sel = Selection::new();
    sel.click(0, additive());
    sel.click(2, additive());

    sel.duplicate_all(&mut items);
    assert_eq!(items, vec!["a", "a", "b", "c", "c"]);
    assert_eq!(sel.indices(), &[1, 4]);

    sel.delete_all(&mut items);
    assert_eq!(items, vec!["a", "b", "c"]);
    assert!(sel.is_empty());
    assert_eq!(sel.anchor(), None);
}

#[test]
fn indices_stay_unique_and_bounded_under_arbitrary_sequences() {
    let mut sel = Selection::new();
    sel.select(4);
    sel.click(9, range());
    sel.click(6, additive());
    sel.click(6, additive());
    sel.click(6, additive());
    sel.click(12, additive());
    sel.trim(0, 10);

    let held: Vec<usize> = sel.iter().collect();
    let mut deduped = held.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(held.len(), deduped.len(), "indices must be unique: {held:?}");
    assert!(held.iter().all(|&i| i < 10), "indices escaped trim bounds: {held:?}");
}

#[test]
fn trim_after_duplicate_keeps_invariants() {
    let mut items = vec![0, 1, 2, 3];
    let mut sel = Selection::new();
    sel.click(1, additive());
    sel.click(3, additive());
    sel.duplicate_all(&mut items);
    assert_eq!(items, vec![0, 1, 1, 2, 3, 3]);
    assert_eq!(sel.indices(), &[2, 5]);

    items.truncate(4);
    sel.trim(0, items.len());
    assert_eq!(sel.indices(), &[2]);
    assert_eq!(sel.anchor(), Some(2));
}

#[test]
fn revert_spanning_owners_is_rejected_up_front() {
    #[derive(Clone)]
    struct Field {
        value: i32,
        template: i32,
    }
    impl Revert for Field {
        fn revert(&mut self) {
            self.value = self.template;
        }
    }

    let mut items = vec![
        Field {
            value: 10,
            template: 1,
        },
        Field {
            value: 20,
            template: 2,
        },
    ];
    let mut sel = Selection::new();
    sel.click(0, additive());
    sel.click(1, additive());

    let err = sel.revert_all(&mut items, 3).unwrap_err();
    assert!(matches!(err, SearchError::MultiOwnerRevert { owners: 3 }));
    assert_eq!(items[0].value, 10, "no partial revert may happen");

    sel.revert_all(&mut items, 1).unwrap();
    assert_eq!(items[0].value, 1);
    assert_eq!(items[1].value, 2);
}
