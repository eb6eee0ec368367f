use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed catalog response: {0}")]
    Response(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
