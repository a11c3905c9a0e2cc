use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Unknown queue: {0} (expected 'solo' or 'flex')")]
    UnknownQueue(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Write conflict on blob '{0}'")]
    WriteConflict(String),
}
