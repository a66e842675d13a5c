use outline_core::{
    EngineConfig, ItemContent, ItemId, ItemType, OutlineEngine, PropertyPath, TabCorrespondence,
    TabId, TextItem, TOP_ITEM_ID,
};

fn setup_with_limit(limit: usize) -> OutlineEngine {
    OutlineEngine::new(EngineConfig {
        undo_history_limit: limit,
        ..EngineConfig::default()
    })
}

fn new_text(engine: &mut OutlineEngine, content: &str) -> ItemId {
    engine.create_item(ItemContent::Text(TextItem {
        content: content.to_string(),
    }))
}

#[test]
fn undo_restores_child_list_without_recycling_ids() {
    let mut engine = setup_with_limit(1);
    let new_id = new_text(&mut engine, "new");
    let before = engine.child_ids(TOP_ITEM_ID).unwrap().to_vec();
    engine.commit();

    engine.save_snapshot_for_undo();
    engine.insert_as_last_child(TOP_ITEM_ID, new_id, None).unwrap();
    assert!(engine.undo());

    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), before.as_slice());
    assert!(engine.exists(new_id));
    assert!(!engine.state().available_item_ids.contains(&new_id));
    assert!(engine
        .pending_mutations()
        .contains(&PropertyPath::StateReplaced));
    engine.state().check_integrity().unwrap();
}

#[test]
fn undo_without_snapshot_is_a_no_op() {
    let mut engine = setup_with_limit(1);
    let item = new_text(&mut engine, "kept");
    engine.insert_as_last_child(TOP_ITEM_ID, item, None).unwrap();

    assert!(!engine.undo());
    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[item]);
}

#[test]
fn undo_restores_pending_set_captured_with_snapshot() {
    let mut engine = setup_with_limit(1);
    let item = new_text(&mut engine, "x");
    engine.save_snapshot_for_undo();
    engine.commit();
    engine.insert_as_last_child(TOP_ITEM_ID, item, None).unwrap();

    engine.undo();

    let pending = engine.pending_mutations();
    assert!(pending.contains(&PropertyPath::ItemEntry(item)));
    assert!(pending.contains(&PropertyPath::StateReplaced));
}

#[test]
fn single_level_history_keeps_only_latest_snapshot() {
    let mut engine = setup_with_limit(1);
    let first = new_text(&mut engine, "first");
    let second = new_text(&mut engine, "second");

    engine.save_snapshot_for_undo();
    engine.insert_as_last_child(TOP_ITEM_ID, first, None).unwrap();
    engine.save_snapshot_for_undo();
    engine.insert_as_last_child(TOP_ITEM_ID, second, None).unwrap();

    assert!(engine.undo());
    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[first]);
    assert!(!engine.undo());
}

#[test]
fn deeper_history_steps_back_in_order() {
    let mut engine = setup_with_limit(3);
    let first = new_text(&mut engine, "first");
    let second = new_text(&mut engine, "second");

    engine.save_snapshot_for_undo();
    engine.insert_as_last_child(TOP_ITEM_ID, first, None).unwrap();
    engine.save_snapshot_for_undo();
    engine.insert_as_last_child(TOP_ITEM_ID, second, None).unwrap();
    assert_eq!(engine.undo_depth(), 2);

    assert!(engine.undo());
    assert_eq!(engine.child_ids(TOP_ITEM_ID).unwrap(), &[first]);
    assert!(engine.undo());
    assert!(engine.child_ids(TOP_ITEM_ID).unwrap().is_empty());
    assert!(!engine.undo());
}

#[test]
fn content_edits_after_snapshot_do_not_leak_into_it() {
    let mut engine = setup_with_limit(1);
    let item = new_text(&mut engine, "original");

    engine.save_snapshot_for_undo();
    engine
        .set_content(
            item,
            ItemContent::Text(TextItem {
                content: "edited".to_string(),
            }),
        )
        .unwrap();
    engine.toggle_style_tag(item, "done").unwrap();
    assert_eq!(engine.plain_text(item).unwrap(), "edited");

    engine.undo();
    assert_eq!(engine.plain_text(item).unwrap(), "original");
    assert!(engine.item(item).unwrap().style_tags.is_empty());
}

#[test]
fn deleted_id_stays_referenced_by_history_until_dropped() {
    let mut engine = setup_with_limit(1);
    let item = new_text(&mut engine, "doomed");
    engine.insert_as_last_child(TOP_ITEM_ID, item, None).unwrap();

    engine.save_snapshot_for_undo();
    engine.delete_subtree(item).unwrap();
    assert!(engine.is_referenced_by_undo_history(item));

    assert!(engine.undo());
    assert!(engine.exists(item));
    assert!(!engine.state().available_item_ids.contains(&item));
    assert!(!engine.is_referenced_by_undo_history(item));
    assert_eq!(
        engine.state().item(item).map(|record| record.item_type),
        Some(ItemType::Text)
    );
}

struct TabPerItem;

impl TabCorrespondence for TabPerItem {
    fn tab_id_for(&self, item_id: ItemId) -> Option<TabId> {
        Some(item_id as TabId)
    }
}

#[test]
fn undoing_a_deletion_keeps_restored_tabs_open() {
    let mut engine = setup_with_limit(1).with_tabs(Box::new(TabPerItem));
    let kept = new_text(&mut engine, "kept");
    let gone = new_text(&mut engine, "gone");
    engine.insert_as_last_child(TOP_ITEM_ID, gone, None).unwrap();
    engine.delete_subtree(gone).unwrap();

    engine.insert_as_last_child(TOP_ITEM_ID, kept, None).unwrap();
    engine.save_snapshot_for_undo();
    engine.delete_subtree(kept).unwrap();
    assert!(engine.undo());

    assert!(engine.exists(kept));
    assert_eq!(engine.take_tabs_to_close(), vec![gone as TabId]);
}
