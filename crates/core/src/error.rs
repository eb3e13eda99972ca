use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Template {template_id} has no source base to snapshot")]
    MissingSource { template_id: DbId },

    #[error("No template workspace is configured (no space flagged is_template)")]
    NoTemplateWorkspace,

    #[error("Template {template_id} cannot be published without a snapshot")]
    PublishPrecondition { template_id: DbId },

    #[error("Collection {collection} has no rows to order against")]
    NoRows { collection: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::MissingSource { .. } => "MISSING_SOURCE",
            CoreError::NoTemplateWorkspace => "NO_TEMPLATE_WORKSPACE",
            CoreError::PublishPrecondition { .. } => "PUBLISH_PRECONDITION",
            CoreError::NoRows { .. } => "NO_ROWS",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller can fix the failure by changing its request.
    ///
    /// `NoTemplateWorkspace` and `Internal` need an operator instead.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound { .. }
                | CoreError::MissingSource { .. }
                | CoreError::PublishPrecondition { .. }
                | CoreError::NoRows { .. }
                | CoreError::Validation(_)
        )
    }
}
