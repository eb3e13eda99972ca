//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods used inside transactions take a generic `PgExecutor`; the rest
//! accept `&PgPool` as the first argument.

pub mod base_repo;
pub mod order_repo;
pub mod space_repo;
pub mod template_category_repo;
pub mod template_repo;

pub use base_repo::BaseRepo;
pub use order_repo::{OrderBounds, OrderRepo};
pub use space_repo::SpaceRepo;
pub use template_category_repo::TemplateCategoryRepo;
pub use template_repo::TemplateRepo;
