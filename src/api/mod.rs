//! Purpose: Define the stable public Rust API boundary for biblio.
//! Exports: Catalog types and the session operations needed by the CLI and tests.
//! Role: Public, additive-only surface; hides internal storage modules.
//! Invariants: This module is the only public path that couples catalog
//! Invariants: mutations to store persistence.

mod client;

pub use crate::core::catalog::{
    AddBook, AddMember, Book, Catalog, LOAN_PERIOD_DAYS, LoanReceipt, Member, ReturnReceipt,
};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::store::LoadStatus;
pub use client::{ApiResult, CatalogStore};
