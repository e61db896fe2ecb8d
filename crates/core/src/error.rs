use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The magic-link token is malformed, unknown, or points at an inactive wedding.
    #[error("Invalid or expired invitation link")]
    InvalidToken,

    /// The principal is a planner whose account has been disabled.
    #[error("Planner account is disabled")]
    PlannerDisabled,

    /// The wedding's RSVP cutoff has passed; responses are read-only.
    #[error("The RSVP deadline for this wedding has passed")]
    RsvpClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::PlannerDisabled => "PLANNER_DISABLED",
            Self::RsvpClosed => "RSVP_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(CoreError::InvalidToken.code(), "INVALID_TOKEN");
        assert_eq!(CoreError::PlannerDisabled.code(), "PLANNER_DISABLED");
        assert_eq!(CoreError::Unauthorized("x".into()).code(), "UNAUTHORIZED");
        assert_eq!(
            CoreError::NotFound {
                entity: "Family",
                id: 3
            }
            .code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = CoreError::NotFound {
            entity: "Table",
            id: 9,
        };
        assert_eq!(err.to_string(), "Entity not found: Table with id 9");
    }
}
