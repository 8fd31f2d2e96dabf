//! Purpose: Session wrapper coupling catalog operations to persistence.
//! Exports: `CatalogStore`, `ApiResult`.
//! Role: Stable boundary for the CLI; one session per process run.
//! Invariants: The store is loaded once at open and fully rewritten after
//! Invariants: every successful mutation; failed operations do not rewrite it.
//! Invariants: A missing or corrupt store opens as an empty catalog (the
//! Invariants: `LoadStatus` records which); opening never fails.

use std::path::{Path, PathBuf};

use time::{Date, OffsetDateTime};

use crate::core::catalog::{
    AddBook, AddMember, Book, Catalog, LoanReceipt, Member, ReturnReceipt,
};
use crate::core::error::Error;
use crate::core::store::{self, LoadStatus};

pub type ApiResult<T> = Result<T, Error>;

pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
    load_status: LoadStatus,
}

impl CatalogStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = store::load(&path);
        Self {
            path,
            catalog: loaded.catalog,
            load_status: loaded.status,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn books(&self) -> &[Book] {
        &self.catalog.books
    }

    pub fn members(&self) -> &[Member] {
        &self.catalog.members
    }

    pub fn find_book(&self, title: &str) -> Option<&Book> {
        self.catalog.find_book(title)
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.catalog.find_member(name)
    }

    pub fn add_book(&mut self, title: &str, author: &str, copies: u32) -> ApiResult<AddBook> {
        let outcome = self.catalog.add_book(title, author, copies);
        self.persist()?;
        Ok(outcome)
    }

    pub fn add_member(&mut self, name: &str) -> ApiResult<AddMember> {
        let outcome = self.catalog.add_member(name);
        if outcome.mutated() {
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn borrow_book(&mut self, member: &str, title: &str) -> ApiResult<LoanReceipt> {
        self.borrow_book_on(member, title, today_utc())
    }

    pub fn borrow_book_on(
        &mut self,
        member: &str,
        title: &str,
        today: Date,
    ) -> ApiResult<LoanReceipt> {
        let receipt = self.catalog.borrow_book(member, title, today)?;
        self.persist()?;
        Ok(receipt)
    }

    pub fn return_book(&mut self, member: &str, title: &str) -> ApiResult<ReturnReceipt> {
        self.return_book_on(member, title, today_utc())
    }

    pub fn return_book_on(
        &mut self,
        member: &str,
        title: &str,
        today: Date,
    ) -> ApiResult<ReturnReceipt> {
        let receipt = self.catalog.return_book(member, title, today)?;
        self.persist()?;
        Ok(receipt)
    }

    fn persist(&self) -> ApiResult<()> {
        store::save(&self.path, &self.catalog)
    }
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::CatalogStore;
    use crate::core::error::ErrorKind;
    use crate::core::store::LoadStatus;
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::August, 26).expect("date")
    }

    #[test]
    fn mutations_rewrite_the_store_and_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");

        let mut session = CatalogStore::open(&path);
        assert_eq!(session.load_status(), LoadStatus::Missing);
        session.add_book("Dune", "Frank Herbert", 2).expect("add book");
        session.add_member("Alice").expect("add member");
        session
            .borrow_book_on("Alice", "Dune", today())
            .expect("borrow");

        let reopened = CatalogStore::open(&path);
        assert_eq!(reopened.load_status(), LoadStatus::Loaded);
        assert_eq!(reopened.catalog(), session.catalog());
        assert_eq!(reopened.find_book("dune").expect("book").copies, 1);
    }

    #[test]
    fn failed_operations_leave_the_store_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");

        let mut session = CatalogStore::open(&path);
        session.add_book("Dune", "Frank Herbert", 1).expect("add book");
        let before = std::fs::read_to_string(&path).expect("read");

        let err = session
            .borrow_book_on("Mallory", "Dune", today())
            .expect_err("unknown member");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let after = std::fs::read_to_string(&path).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn already_existing_member_does_not_rewrite_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");

        let mut session = CatalogStore::open(&path);
        session.add_member("Alice").expect("add member");
        let before = std::fs::read_to_string(&path).expect("read");

        let outcome = session.add_member("alice").expect("repeat add");
        assert!(!outcome.mutated());
        let after = std::fs::read_to_string(&path).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn corrupt_store_opens_as_empty_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "]]").expect("write");

        let session = CatalogStore::open(&path);
        assert_eq!(session.load_status(), LoadStatus::Recovered);
        assert!(session.books().is_empty());
        assert!(session.members().is_empty());
    }
}
