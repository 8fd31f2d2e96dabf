// Core modules implementing the catalog model, persistence, and error modeling.
pub mod catalog;
pub mod error;
pub mod store;
