//! Domain types and pure rules for the template catalog.
//!
//! Nothing in this crate touches the database. Order key arithmetic,
//! snapshot/cover value types and the publish precondition live here so
//! they can be unit tested without a store.

pub mod cover;
pub mod error;
pub mod ordering;
pub mod snapshot;
pub mod types;
