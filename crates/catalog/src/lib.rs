//! Template catalog service.
//!
//! [`service::CatalogService`] is the entry point. It delegates order key
//! assignment to [`ordering::OrderingManager`] and the snapshot lifecycle to
//! [`snapshot::SnapshotManager`]. External systems (base duplication, asset
//! URL signing, bucket naming) plug in through the traits in
//! [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod ordering;
pub mod preview;
pub mod service;
pub mod snapshot;
