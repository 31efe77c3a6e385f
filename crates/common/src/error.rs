use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("the person {0} already exists")]
    AlreadyExists(String),

    #[error("the person {0} does not exist")]
    NotFound(String),

    /// Stored or returned bytes could not be decoded. Treated as a data
    /// integrity fault, never skipped.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("World state error: {0}")]
    State(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AlreadyExists(_) => "already_exists",
            Error::NotFound(_) => "not_found",
            Error::Serialization(_) => "serialization",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::UnknownFunction(_) => "unknown_function",
            Error::InvalidSignature(_) => "invalid_signature",
            Error::State(_) => "state",
            Error::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
