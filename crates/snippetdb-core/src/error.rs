use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding provider failed: {0:#}")]
    Provider(anyhow::Error),

    #[error("Cannot read document source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn provider(msg: impl std::fmt::Display) -> Self {
        Self::Provider(anyhow::anyhow!("{msg}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
