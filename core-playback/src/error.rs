use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio engine failure: {0}")]
    Engine(String),

    #[error("Catalog lookup failed: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Queue persistence failed: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
