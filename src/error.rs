use axum::http::StatusCode;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    #[error("storage capacity exceeded ({needed} of {capacity} bytes), free some photos and retry")]
    StorageCapacityExceeded { needed: usize, capacity: usize },

    #[error("concurrent update of `{0}`, retry")]
    Conflict(String),

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("another photo upload is still pending")]
    UploadBusy,

    #[error("upload was superseded before it finished")]
    Superseded,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiaryError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::StorageCapacityExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
            Self::Conflict(_) | Self::UploadBusy | Self::Superseded => StatusCode::CONFLICT,
            Self::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may simply repeat the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StorageCapacityExceeded { .. } | Self::Conflict(_) | Self::UploadBusy
        )
    }
}

/// Maps a domain error onto the handler rejection tuple.
pub fn reject(e: DiaryError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() && !e.is_retryable() {
        error!(error = %e, %status, "request failed");
    } else {
        warn!(error = %e, %status, "request rejected");
    }
    (status, e.to_string())
}
