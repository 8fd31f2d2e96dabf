//! Purpose: Whole-file JSON persistence for the catalog.
//! Exports: `load`, `save`, `LoadedCatalog`, `LoadStatus`.
//! Role: Owns the on-disk wire format; `core::catalog` stays persistence-free.
//! Invariants: The store is a single JSON document with `books` and `members`
//! Invariants: arrays; field names are a compatibility contract.
//! Invariants: Save rewrites the full file in place; there is no locking and
//! Invariants: no atomic rename, so concurrent writers are unsupported.
//! Invariants: A missing or undecodable store loads as an empty catalog.

use std::io;
use std::path::Path;

use crate::core::catalog::Catalog;
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadStatus {
    /// Store file was absent; starting from an empty catalog.
    Missing,
    /// Store file parsed cleanly.
    Loaded,
    /// Store file existed but could not be read or decoded; its content is
    /// abandoned and an empty catalog takes its place.
    Recovered,
}

#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub status: LoadStatus,
}

pub fn load(path: &Path) -> LoadedCatalog {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return LoadedCatalog {
                catalog: Catalog::default(),
                status: LoadStatus::Missing,
            };
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable catalog store");
            return LoadedCatalog {
                catalog: Catalog::default(),
                status: LoadStatus::Recovered,
            };
        }
    };

    match serde_json::from_str::<Catalog>(&text) {
        Ok(catalog) => LoadedCatalog {
            catalog,
            status: LoadStatus::Loaded,
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed catalog store");
            LoadedCatalog {
                catalog: Catalog::default(),
                status: LoadStatus::Recovered,
            }
        }
    }
}

pub fn save(path: &Path, catalog: &Catalog) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to create store directory")
                .with_path(parent)
                .with_source(err)
        })?;
    }

    let text = serde_json::to_string_pretty(catalog).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode catalog")
            .with_source(err)
    })?;

    std::fs::write(path, text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write catalog store")
            .with_path(path)
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{LoadStatus, load, save};
    use crate::core::catalog::Catalog;
    use serde_json::Value;
    use time::{Date, Month};

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_book("Dune", "Frank Herbert", 2);
        catalog.add_book("Hyperion", "Dan Simmons", 1);
        catalog.add_member("Alice");
        let today = Date::from_calendar_date(2026, Month::August, 26).expect("date");
        catalog.borrow_book("Alice", "Dune", today).expect("borrow");
        catalog
    }

    #[test]
    fn save_then_load_reproduces_the_catalog() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let catalog = sample_catalog();

        save(&path, &catalog).expect("save");
        let loaded = load(&path);
        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.catalog, catalog);
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load(&dir.path().join("absent.json"));
        assert_eq!(loaded.status, LoadStatus::Missing);
        assert_eq!(loaded.catalog, Catalog::default());
    }

    #[test]
    fn malformed_store_recovers_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").expect("write");

        let loaded = load(&path);
        assert_eq!(loaded.status, LoadStatus::Recovered);
        assert_eq!(loaded.catalog, Catalog::default());
    }

    #[test]
    fn wire_format_field_names_are_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        save(&path, &sample_catalog()).expect("save");

        let text = std::fs::read_to_string(&path).expect("read");
        let value: Value = serde_json::from_str(&text).expect("json");

        let book = &value["books"][0];
        assert_eq!(book["title"], "Dune");
        assert_eq!(book["author"], "Frank Herbert");
        assert_eq!(book["copies"], 1);

        let member = &value["members"][0];
        assert_eq!(member["name"], "Alice");
        assert_eq!(member["borrowed_books"]["Dune"], "2026-09-09");
    }

    #[test]
    fn store_written_by_another_tool_is_accepted() {
        // Hand-written store: no `copies` on one book, no `borrowed_books`
        // on one member. Both fields default rather than fail the load.
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
              "books": [{"title": "Dune", "author": "Frank Herbert"}],
              "members": [{"name": "Alice"}]
            }"#,
        )
        .expect("write");

        let loaded = load(&path);
        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.catalog.books[0].copies, 1);
        assert!(loaded.catalog.members[0].borrowed_books.is_empty());
    }
}
