//! Purpose: Shared core library crate used by the `biblio` CLI and tests.
//! Exports: `core` (catalog model, JSON store, errors) and `api` (sessions).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
pub mod store_paths;
