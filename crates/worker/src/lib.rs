//! Background maintenance for the template catalog.

pub mod janitor;
