use outline_core::{
    EngineConfig, EngineError, ItemContent, ItemId, ItemPath, ItemType, OutlineEngine,
    PropertyPath, TOP_ITEM_ID,
};

fn setup() -> OutlineEngine {
    OutlineEngine::new(EngineConfig::default())
}

fn new_text(engine: &mut OutlineEngine) -> ItemId {
    engine.create_item(ItemContent::empty(ItemType::Text))
}

fn path(ids: &[ItemId]) -> ItemPath {
    ItemPath::new(ids.to_vec()).unwrap()
}

#[test]
fn seed_state_has_mounted_top_page() {
    let engine = setup();
    assert!(engine.state().is_page(TOP_ITEM_ID));
    assert_eq!(engine.state().mounted_page_ids, vec![TOP_ITEM_ID]);
    assert_eq!(engine.active_page_id(), TOP_ITEM_ID);
    assert_eq!(engine.state().max_item_id, 0);
}

#[test]
fn page_state_machine_round_trip() {
    let mut engine = setup();
    let item = new_text(&mut engine);

    engine.turn_into_page(item).unwrap();
    assert!(engine.state().is_page(item));
    assert!(!engine.state().is_mounted(item));
    assert_eq!(engine.target_item_path(item).unwrap(), &ItemPath::root(item));
    assert_eq!(engine.anchor_item_path(item).unwrap(), &ItemPath::root(item));

    engine.mount_page(item).unwrap();
    assert!(engine.state().is_mounted(item));

    engine.unmount_page(item).unwrap();
    assert!(!engine.state().is_mounted(item));
    assert!(engine.exists(item));

    engine.turn_into_non_page(item).unwrap();
    assert!(!engine.state().is_page(item));
    engine.state().check_integrity().unwrap();
}

#[test]
fn un_paging_a_mounted_page_unmounts_it() {
    let mut engine = setup();
    let item = new_text(&mut engine);
    engine.turn_into_page(item).unwrap();
    engine.switch_active_page(item).unwrap();
    assert_eq!(engine.active_page_id(), item);

    engine.turn_into_non_page(item).unwrap();

    assert!(!engine.state().is_mounted(item));
    assert_eq!(engine.active_page_id(), TOP_ITEM_ID);
    engine.state().check_integrity().unwrap();
}

#[test]
fn repeated_toggles_record_nothing() {
    let mut engine = setup();
    let item = new_text(&mut engine);
    engine.turn_into_page(item).unwrap();
    engine.mount_page(item).unwrap();
    engine.commit();

    engine.turn_into_page(item).unwrap();
    engine.mount_page(item).unwrap();
    assert!(engine.pending_mutations().is_empty());
}

#[test]
fn switching_moves_page_to_end_of_mounted_list() {
    let mut engine = setup();
    let first = new_text(&mut engine);
    let second = new_text(&mut engine);
    for page in [first, second] {
        engine.turn_into_page(page).unwrap();
        engine.mount_page(page).unwrap();
    }

    engine.switch_active_page(first).unwrap();

    assert_eq!(engine.state().mounted_page_ids, vec![TOP_ITEM_ID, second, first]);
    assert!(engine
        .pending_mutations()
        .contains(&PropertyPath::Workspace(engine.current_workspace_id())));
}

#[test]
fn selection_spans_siblings_between_anchor_and_target() {
    let mut engine = setup();
    let ids: Vec<ItemId> = (0..4).map(|_| new_text(&mut engine)).collect();
    for id in &ids {
        engine.insert_as_last_child(TOP_ITEM_ID, *id, None).unwrap();
    }

    engine
        .set_target_item_path(TOP_ITEM_ID, path(&[TOP_ITEM_ID, ids[3]]))
        .unwrap();
    engine
        .set_anchor_item_path(TOP_ITEM_ID, path(&[TOP_ITEM_ID, ids[1]]))
        .unwrap();

    assert_eq!(
        engine.selected_item_paths(TOP_ITEM_ID).unwrap(),
        vec![
            path(&[TOP_ITEM_ID, ids[1]]),
            path(&[TOP_ITEM_ID, ids[2]]),
            path(&[TOP_ITEM_ID, ids[3]]),
        ]
    );

    engine
        .set_target_item_path(TOP_ITEM_ID, path(&[TOP_ITEM_ID, ids[0]]))
        .unwrap();
    assert_eq!(
        engine.selected_item_paths(TOP_ITEM_ID).unwrap(),
        vec![path(&[TOP_ITEM_ID, ids[0]])]
    );
}

#[test]
fn unresolvable_cursor_path_is_rejected() {
    let mut engine = setup();
    let loose = new_text(&mut engine);

    assert_eq!(
        engine
            .set_target_item_path(TOP_ITEM_ID, path(&[TOP_ITEM_ID, loose]))
            .unwrap_err(),
        EngineError::NotConnected {
            parent_id: TOP_ITEM_ID,
            item_id: loose
        }
    );
    assert_eq!(
        engine
            .set_anchor_item_path(loose, ItemPath::root(loose))
            .unwrap_err(),
        EngineError::NotAPage(loose)
    );
}

#[test]
fn top_item_stays_a_mounted_page() {
    let mut engine = setup();
    engine.commit();

    assert_eq!(
        engine.turn_into_non_page(TOP_ITEM_ID).unwrap_err(),
        EngineError::TopItemUnpaging
    );
    assert!(engine.pending_mutations().is_empty());
    assert!(engine.state().is_page(TOP_ITEM_ID));
    assert_eq!(engine.state().mounted_page_ids, vec![TOP_ITEM_ID]);
    assert_eq!(
        engine.target_item_path(engine.active_page_id()).unwrap(),
        &ItemPath::root(TOP_ITEM_ID)
    );
}
