use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Registration of '{hostname}' failed: {reason}")]
    RegistrationFailed { hostname: String, reason: String },

    #[error("'{0}' has not registered with the directory")]
    UnknownHost(String),

    #[error("Directory unreachable while resolving '{hostname}'")]
    DirectoryUnreachable { hostname: String },

    #[error("Malformed directory reply: {0}")]
    MalformedReply(String),

    #[error(transparent)]
    Fabric(#[from] bazaar_fabric::Error),
}

impl Error {
    /// Resolution failures a caller can log and move past
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownHost(_) | Self::DirectoryUnreachable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
