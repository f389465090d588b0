use std::time::Duration;

/// The only message a user ever sees for a failed lookup.
pub const CITY_NOT_FOUND: &str = "City not found";

/// Failures of a single weather lookup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider payload: {0}")]
    Malformed(String),

    #[error("Provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("City name is empty")]
    EmptyCity,
}

impl ProviderError {
    /// All failure kinds collapse to the same user-facing message.
    pub fn user_message(&self) -> &'static str {
        CITY_NOT_FOUND
    }
}

/// Failures of the key-value persistence store. Never shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid store key '{0}'")]
    InvalidKey(String),
}
