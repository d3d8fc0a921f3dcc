use thiserror::Error;

/// Domain failures. The HTTP layer maps each variant onto a status code;
/// `Internal` carries storage errors whose details never reach the client.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MessagingError {
    pub(crate) fn not_member(user_id: &str, conversation_id: &str) -> Self {
        MessagingError::Forbidden(format!(
            "user {user_id} is not a member of conversation {conversation_id}"
        ))
    }
}

pub type Result<T> = std::result::Result<T, MessagingError>;
