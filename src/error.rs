use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code used by the command line front-end.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(_) | AppError::Json(_) => 2,
            AppError::NotFound(_) | AppError::Io(_) => 3,
            AppError::Database(_) => 4,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
