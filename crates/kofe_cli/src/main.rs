//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a content store (file path argument, or in-memory).
//! - Make sure the registry has its first language and print a summary.
//!
//! Environment:
//! - `KOFE_CONFIG`: path to a JSON engine config.
//! - `KOFE_LOG_DIR`: absolute directory for rolling log files.

use kofe_core::db::{open_db, open_db_in_memory};
use kofe_core::{
    core_version, default_log_level, init_logging, EngineConfig, LanguageService, NodeService,
    NodeView,
};
use log::info;
use std::env;
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = env::var("KOFE_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let config = match env::var("KOFE_CONFIG") {
        Ok(path) => EngineConfig::from_json_str(&fs::read_to_string(path)?)?,
        Err(_) => EngineConfig::default(),
    };

    let conn = match env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    info!("event=cli_start module=cli status=ok");

    let languages = LanguageService::try_new(&conn, config)?;
    let init = languages.initialize_first(None)?;
    println!("kofe_core version={}", core_version());
    println!("init: {}", init.message());

    for language in languages.all_languages()? {
        println!(
            "language code={} name={} default={} active={}",
            language.code, language.name, language.bydefault, language.active
        );
    }

    let nodes = NodeService::try_new(&conn)?;
    let tree = nodes.tree(false)?;
    let total: usize = tree.iter().map(NodeView::node_count).sum();
    println!("tree roots={} nodes={total}", tree.len());
    for root in &tree {
        print_node(root, 0);
    }
    Ok(())
}

fn print_node(node: &NodeView, depth: usize) {
    let title = node
        .descriptors
        .first()
        .map(|descriptor| descriptor.title.as_str())
        .unwrap_or_default();
    println!(
        "{:indent$}- {} {title} active={}",
        "",
        node.id,
        node.active,
        indent = depth * 2
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
