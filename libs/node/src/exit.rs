use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Process exit statuses shared by every binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    BadArgs = 1,
    RegistrationFailed = 2,
    BindFailed = 3,
    LookupFailed = 5,
    DirectoryUnreachable = 6,
    StoreUnreachable = 7,
    NoSuchItem = 8,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// A fault that ends the process
#[derive(Error, Debug)]
pub enum Fatal {
    #[error("Could not load {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: bazaar_core::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Socket couldn't be opened: {0}")]
    Bind(#[source] bazaar_fabric::Error),

    #[error("Registration with the directory failed: {0}")]
    Registration(#[source] bazaar_directory::Error),

    #[error("Peer lookup failed: {0}")]
    Lookup(#[source] bazaar_directory::Error),

    #[error(transparent)]
    Market(#[from] bazaar_market::Error),
}

impl Fatal {
    pub fn status(&self) -> ExitStatus {
        match self {
            Self::Table { .. } | Self::Config(_) => ExitStatus::BadArgs,
            Self::Bind(_) => ExitStatus::BindFailed,
            Self::Registration(_) => ExitStatus::RegistrationFailed,
            Self::Lookup(bazaar_directory::Error::UnknownHost(_)) => ExitStatus::LookupFailed,
            Self::Lookup(_) => ExitStatus::DirectoryUnreachable,
            Self::Market(bazaar_market::Error::NoSuchItem(_)) => ExitStatus::NoSuchItem,
            Self::Market(_) => ExitStatus::StoreUnreachable,
        }
    }
}
