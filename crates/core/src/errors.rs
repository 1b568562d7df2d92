use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Duplicate slot number: {0}")]
    DuplicateSlotNumber(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Slot in use: {0}")]
    SlotInUse(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Authorization error: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ParkError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParkError::NotFound(_) => "NOT_FOUND",
            ParkError::DuplicateSlotNumber(_) => "DUPLICATE_SLOT_NUMBER",
            ParkError::SlotUnavailable(_) => "SLOT_UNAVAILABLE",
            ParkError::SlotInUse(_) => "SLOT_IN_USE",
            ParkError::InvalidTransition(_) => "INVALID_TRANSITION",
            ParkError::InvalidState(_) => "INVALID_STATE",
            ParkError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ParkError::Validation(_) => "VALIDATION",
            ParkError::Unauthorized(_) => "UNAUTHORIZED",
            ParkError::Forbidden(_) => "FORBIDDEN",
            ParkError::Database(_) => "DATABASE",
            ParkError::Internal(_) => "INTERNAL",
        }
    }
}

pub type ParkResult<T> = Result<T, ParkError>;
