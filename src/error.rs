#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
