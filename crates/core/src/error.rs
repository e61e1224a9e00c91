use crate::types::DbId;

/// Domain errors shared by every commerce crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected before reaching storage.
    #[error("Validation failed: {0}")]
    Validation(String),
}
