//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a snapshot database, load or seed the outline, print a
//!   summary and flush it back.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `outline_cli [DB_PATH] [CONFIG_JSON_PATH]`. Without `DB_PATH` an
//! in-memory database is used. `OUTLINE_LOG_DIR` enables file logging.

use log::info;
use outline_core::db::{open_db, open_db_in_memory};
use outline_core::{
    default_log_level, init_logging, EngineConfig, ItemContent, ItemPath, OutlineEngine,
    SqliteStateRepository, TextItem, TOP_ITEM_ID,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("outline_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("outline_core ping={}", outline_core::ping());
    println!("outline_core version={}", outline_core::core_version());

    if let Ok(log_dir) = std::env::var("OUTLINE_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let config = match args.next() {
        Some(path) => EngineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let conn = match &db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteStateRepository::try_new(&conn)?;
    let mut engine = OutlineEngine::load_or_seed(&repo, config)?;

    if engine.child_ids(TOP_ITEM_ID)?.is_empty() {
        let welcome = engine.create_item(ItemContent::Text(TextItem {
            content: "Welcome".to_string(),
        }));
        engine.insert_below(&ItemPath::root(TOP_ITEM_ID), welcome, None)?;
    }

    let state = engine.state();
    println!("items={}", state.items.len());
    println!("max_item_id={}", state.max_item_id);
    println!("mounted_pages={:?}", state.mounted_page_ids);
    println!("workspaces={}", state.workspaces.len());
    for child_id in engine.child_ids(TOP_ITEM_ID)? {
        println!("  - [{child_id}] {}", engine.plain_text(*child_id)?);
    }

    info!(
        "event=cli_run module=cli status=ok persistent={} items={}",
        db_path.is_some(),
        state.items.len()
    );
    engine.shutdown(&repo)?;
    Ok(())
}
