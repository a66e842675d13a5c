use outline_core::{
    EngineConfig, EngineError, ItemContent, ItemId, ItemPath, ItemType, OutlineEngine,
    TOP_ITEM_ID,
};

fn setup() -> OutlineEngine {
    OutlineEngine::new(EngineConfig {
        default_workspace_name: "Home".to_string(),
        ..EngineConfig::default()
    })
}

fn new_text(engine: &mut OutlineEngine) -> ItemId {
    engine.create_item(ItemContent::empty(ItemType::Text))
}

#[test]
fn seed_workspace_uses_configured_name() {
    let engine = setup();
    let current = engine.current_workspace_id();
    assert_eq!(engine.workspace_ids(), vec![current]);
    assert_eq!(engine.workspace(current).unwrap().name, "Home");
}

#[test]
fn create_rename_and_delete_workspaces() {
    let mut engine = setup();
    let original = engine.current_workspace_id();
    let created = engine.create_workspace();
    assert_eq!(engine.workspace(created).unwrap().name, "Workspace 2");

    engine.rename_workspace(created, "Research").unwrap();
    engine.set_current_workspace_id(created).unwrap();
    assert_eq!(engine.workspace(created).unwrap().name, "Research");

    engine.delete_workspace(created).unwrap();
    assert_eq!(engine.current_workspace_id(), original);
    assert_eq!(
        engine.delete_workspace(original).unwrap_err(),
        EngineError::LastWorkspace
    );
    assert_eq!(
        engine.set_current_workspace_id(created).unwrap_err(),
        EngineError::UnknownWorkspace(created)
    );
}

#[test]
fn exclusions_are_scoped_to_current_workspace() {
    let mut engine = setup();
    let hidden = new_text(&mut engine);
    engine.insert_as_last_child(TOP_ITEM_ID, hidden, None).unwrap();
    engine.set_excluded_item_ids(vec![hidden, hidden]).unwrap();
    assert_eq!(engine.excluded_item_ids(), &[hidden]);
    assert!(engine
        .displaying_child_ids(&ItemPath::root(TOP_ITEM_ID))
        .unwrap()
        .is_empty());

    let other = engine.create_workspace();
    engine.set_current_workspace_id(other).unwrap();
    assert!(engine.excluded_item_ids().is_empty());
    assert_eq!(
        engine
            .displaying_child_ids(&ItemPath::root(TOP_ITEM_ID))
            .unwrap(),
        vec![hidden]
    );
}

#[test]
fn excluding_an_ancestor_hides_mounted_pages_below_it() {
    let mut engine = setup();
    let folder = new_text(&mut engine);
    let page = new_text(&mut engine);
    let free_page = new_text(&mut engine);
    engine.insert_as_last_child(TOP_ITEM_ID, folder, None).unwrap();
    engine.insert_as_last_child(folder, page, None).unwrap();
    for id in [page, free_page] {
        engine.turn_into_page(id).unwrap();
        engine.mount_page(id).unwrap();
    }

    engine.set_excluded_item_ids(vec![folder]).unwrap();

    assert_eq!(
        engine.filtered_mounted_page_ids(),
        vec![TOP_ITEM_ID, free_page]
    );
}

#[test]
fn excluding_unknown_item_fails() {
    let mut engine = setup();
    assert_eq!(
        engine.set_excluded_item_ids(vec![77]).unwrap_err(),
        EngineError::UnknownItem(77)
    );
}
