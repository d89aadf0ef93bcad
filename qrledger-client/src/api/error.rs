use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// 409 from the registry; the message is the server's `error` text.
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("registry returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid registry URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ClientError::Validation(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Duplicate(message),
            _ => ClientError::Api { status, message },
        }
    }

    /// Text suitable for a toast: the server's own words when it sent any.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Duplicate(message)
            | ClientError::NotFound(message)
            | ClientError::Validation(message)
            | ClientError::Api { message, .. } => message.clone(),
            ClientError::Transport(_) => {
                "Could not reach the registry".to_string()
            }
            other => other.to_string(),
        }
    }
}
