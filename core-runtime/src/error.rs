use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or a logging subscriber that could not be installed.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
