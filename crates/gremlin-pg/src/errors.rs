use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgError {
    #[error("only one of connection string or connection ID should be provided")]
    BothInputsProvided,

    #[error("either connection string or connection ID must be provided")]
    NeitherInputProvided,

    #[error("connection ID not found: '{0}'")]
    ConnIdNotFound(String),

    #[error("failed to configure database connection: {0}")]
    ConnectionSetupFailed(String),

    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),
}

impl PgError {
    /// Errors caused by the request itself rather than by the database.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PgError::BothInputsProvided
                | PgError::NeitherInputProvided
                | PgError::ConnIdNotFound(_)
                | PgError::ConnectionSetupFailed(_)
        )
    }
}
