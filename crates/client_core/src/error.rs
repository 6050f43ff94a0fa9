use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a nickname must be chosen before connecting")]
    NicknameRequired,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server_url must start with http://, https://, ws:// or wss://, got '{0}'")]
    UnsupportedScheme(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
