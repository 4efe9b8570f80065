use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartGenError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {message}")]
    Api { message: String, status: u16 },

    #[error("Malformed padding: byte {byte} in {len}-byte buffer")]
    MalformedPadding { byte: u8, len: usize },

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

pub type Result<T> = std::result::Result<T, SmartGenError>;

impl From<serde_json::Error> for SmartGenError {
    fn from(err: serde_json::Error) -> Self {
        SmartGenError::InvalidResponse(err.to_string())
    }
}
