use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store did not answer")]
    StoreUnreachable,

    #[error("No item number {0} in the store listing")]
    NoSuchItem(usize),

    #[error("Malformed listing: {0}")]
    MalformedListing(String),

    #[error(transparent)]
    Fabric(#[from] bazaar_fabric::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
