use outline_core::{
    Edge, EngineConfig, EngineError, ItemContent, ItemId, ItemPath, ItemType, OutlineEngine,
    PropertyPath, TOP_ITEM_ID,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

fn setup() -> OutlineEngine {
    OutlineEngine::new(EngineConfig::default())
}

fn new_text(engine: &mut OutlineEngine) -> ItemId {
    engine.create_item(ItemContent::empty(ItemType::Text))
}

fn path(ids: &[ItemId]) -> ItemPath {
    ItemPath::new(ids.to_vec()).unwrap()
}

/// Top item with children `[a, b]`.
fn two_children(engine: &mut OutlineEngine) -> (ItemId, ItemId) {
    let a = new_text(engine);
    let b = new_text(engine);
    engine.insert_as_last_child(TOP_ITEM_ID, a, None).unwrap();
    engine.insert_as_last_child(TOP_ITEM_ID, b, None).unwrap();
    (a, b)
}

#[test]
fn insert_below_leaf_places_new_item_as_next_sibling() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let new_id = new_text(&mut engine);

    let new_path = engine.insert_below(&path(&[TOP_ITEM_ID, a]), new_id, None).unwrap();

    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[a, new_id, b]);
    assert_eq!(new_path, path(&[TOP_ITEM_ID, new_id]));
    engine.state().check_integrity().unwrap();
}

#[test]
fn insert_below_expanded_parent_places_new_item_first() {
    let mut engine = setup();
    let (a, _) = two_children(&mut engine);
    let existing = new_text(&mut engine);
    engine.insert_as_last_child(a, existing, None).unwrap();
    let new_id = new_text(&mut engine);

    let new_path = engine.insert_below(&path(&[TOP_ITEM_ID, a]), new_id, None).unwrap();

    assert_eq!(engine.child_ids(a).unwrap(), &[new_id, existing]);
    assert_eq!(new_path, path(&[TOP_ITEM_ID, a, new_id]));
}

#[test]
fn insert_below_collapsed_parent_places_new_item_as_sibling() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let hidden = new_text(&mut engine);
    engine.insert_as_last_child(a, hidden, None).unwrap();
    engine.set_is_collapsed(&path(&[TOP_ITEM_ID, a]), true).unwrap();
    let new_id = new_text(&mut engine);

    engine.insert_below(&path(&[TOP_ITEM_ID, a]), new_id, None).unwrap();

    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[a, new_id, b]);
    assert_eq!(engine.child_ids(a).unwrap(), &[hidden]);
}

#[test]
fn insert_below_page_root_inserts_first_child() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let new_id = new_text(&mut engine);

    engine.insert_below(&ItemPath::root(TOP_ITEM_ID), new_id, None).unwrap();

    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[new_id, a, b]);
}

#[test]
fn sibling_insertions_keep_order_and_return_sibling_paths() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let next = new_text(&mut engine);
    let prev = new_text(&mut engine);

    let next_path = engine
        .insert_as_next_sibling(&path(&[TOP_ITEM_ID, a]), next, None)
        .unwrap();
    let prev_path = engine
        .insert_as_prev_sibling(&path(&[TOP_ITEM_ID, a]), prev, Some(Edge::collapsed()))
        .unwrap();

    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[prev, a, next, b]);
    assert_eq!(next_path, Some(path(&[TOP_ITEM_ID, next])));
    assert_eq!(prev_path, Some(path(&[TOP_ITEM_ID, prev])));
    assert!(engine.edge(TOP_ITEM_ID, prev).unwrap().is_collapsed);
    engine.state().check_integrity().unwrap();
}

#[test]
fn sibling_insertion_at_page_root_is_a_silent_no_op() {
    let mut engine = setup();
    let new_id = new_text(&mut engine);
    engine.commit();

    let result = engine
        .insert_as_next_sibling(&ItemPath::root(TOP_ITEM_ID), new_id, None)
        .unwrap();

    assert_eq!(result, None);
    assert!(engine.pending_mutations().is_empty());
    assert_eq!(engine.parent_count(new_id).unwrap(), 0);
}

#[test]
fn sibling_insertion_with_wrong_parent_claim_fails() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let new_id = new_text(&mut engine);

    let err = engine
        .insert_as_next_sibling(&path(&[a, b]), new_id, None)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotConnected {
            parent_id: a,
            item_id: b
        }
    );
}

#[test]
fn transcluded_item_keeps_independent_edges() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let shared = new_text(&mut engine);
    engine.insert_as_last_child(a, shared, None).unwrap();
    engine
        .insert_as_first_child(b, shared, Some(Edge::collapsed()))
        .unwrap();

    assert_eq!(engine.parent_count(shared).unwrap(), 2);
    assert_eq!(engine.parent_ids(shared).unwrap(), vec![a, b]);
    assert!(!engine.is_collapsed(&path(&[TOP_ITEM_ID, a, shared])).unwrap());
    assert!(engine.is_collapsed(&path(&[TOP_ITEM_ID, b, shared])).unwrap());
    engine.state().check_integrity().unwrap();
}

#[test]
fn inserting_an_ancestor_below_its_descendant_is_rejected() {
    let mut engine = setup();
    let (a, _) = two_children(&mut engine);
    let child = new_text(&mut engine);
    let grandchild = new_text(&mut engine);
    engine.insert_as_last_child(a, child, None).unwrap();
    engine.insert_as_last_child(child, grandchild, None).unwrap();
    engine.commit();

    assert_eq!(
        engine.insert_as_last_child(grandchild, a, None).unwrap_err(),
        EngineError::CycleDetected {
            item_id: a,
            parent_id: grandchild
        }
    );
    assert_eq!(
        engine.insert_as_first_child(a, a, None).unwrap_err(),
        EngineError::CycleDetected {
            item_id: a,
            parent_id: a
        }
    );
    assert!(engine.pending_mutations().is_empty());
    assert!(engine.would_create_cycle(grandchild, TOP_ITEM_ID));
    assert_eq!(
        engine.ancestor_ids(grandchild).unwrap(),
        BTreeSet::from([TOP_ITEM_ID, a, child])
    );
    engine.state().check_integrity().unwrap();
}

#[test]
fn duplicate_edge_is_rejected() {
    let mut engine = setup();
    let (a, _) = two_children(&mut engine);

    assert_eq!(
        engine.insert_as_last_child(TOP_ITEM_ID, a, None).unwrap_err(),
        EngineError::DuplicateEdge {
            parent_id: TOP_ITEM_ID,
            item_id: a
        }
    );
}

#[test]
fn labels_are_stored_per_occurrence() {
    let mut engine = setup();
    let (a, _) = two_children(&mut engine);
    let at_a = path(&[TOP_ITEM_ID, a]);

    engine
        .set_labels(&at_a, vec!["todo".to_string(), "later".to_string()])
        .unwrap();
    assert_eq!(engine.labels(&at_a).unwrap(), &["todo", "later"]);
    assert!(matches!(
        engine.labels(&ItemPath::root(TOP_ITEM_ID)),
        Err(EngineError::InvalidPath(_))
    ));
}

#[test]
fn displaying_children_hides_collapsed_and_page_subtrees() {
    let mut engine = setup();
    let (a, b) = two_children(&mut engine);
    let under_a = new_text(&mut engine);
    let under_b = new_text(&mut engine);
    engine.insert_as_last_child(a, under_a, None).unwrap();
    engine.insert_as_last_child(b, under_b, None).unwrap();
    engine.set_is_collapsed(&path(&[TOP_ITEM_ID, a]), true).unwrap();
    engine.turn_into_page(b).unwrap();

    assert!(engine
        .displaying_child_ids(&path(&[TOP_ITEM_ID, a]))
        .unwrap()
        .is_empty());
    assert!(engine
        .displaying_child_ids(&path(&[TOP_ITEM_ID, b]))
        .unwrap()
        .is_empty());
    assert_eq!(engine.displaying_child_ids(&ItemPath::root(b)).unwrap(), vec![under_b]);
}

#[test]
fn commit_notifies_listeners_once_and_clears_pending() {
    let mut engine = setup();
    let batches: Rc<RefCell<Vec<BTreeSet<PropertyPath>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    let listener_id = engine.add_mutation_listener(Box::new(move |_, changed| {
        sink.borrow_mut().push(changed.clone());
    }));

    let a = new_text(&mut engine);
    engine.insert_as_last_child(TOP_ITEM_ID, a, None).unwrap();
    engine.commit();
    engine.commit();

    {
        let batches = batches.borrow();
        assert_eq!(batches.len(), 2);
        assert!(batches[0].contains(&PropertyPath::ChildIds(TOP_ITEM_ID)));
        assert!(batches[0].contains(&PropertyPath::Edge {
            item_id: a,
            parent_id: TOP_ITEM_ID
        }));
        assert!(batches[0].contains(&PropertyPath::ItemEntry(a)));
        assert!(batches[1].is_empty());
    }
    assert!(engine.pending_mutations().is_empty());

    assert!(engine.remove_mutation_listener(listener_id));
    assert!(!engine.remove_mutation_listener(listener_id));
    engine.commit();
    assert_eq!(batches.borrow().len(), 2);
}
