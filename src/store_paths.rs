//! Purpose: Default catalog store path resolution.
//! Exports: `default_store_path`.
//! Role: Keep CLI and test path semantics aligned from one source.
//! Invariants: Default store file remains `~/.biblio/catalog.json`.

use std::path::PathBuf;

pub fn default_store_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".biblio").join("catalog.json")
}
