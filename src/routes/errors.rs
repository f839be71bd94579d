use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use once_cell::sync::OnceCell;

use super::helpers::error_chain_fmt;
use crate::authentication::AuthError;
use crate::broadcast::BroadcastError;
use crate::email_client::EmailError;
use crate::storage::StorageError;

// Raw 500 detail is only exposed outside production.
static VERBOSE_ERRORS: OnceCell<bool> = OnceCell::new();

pub fn set_verbose_errors(enabled: bool) {
    let _ = VERBOSE_ERRORS.set(enabled);
}

fn verbose_errors() -> bool {
    *VERBOSE_ERRORS.get().unwrap_or(&true)
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("no email provider is configured")]
    ProviderUnavailable,
    #[error("failed to deliver the email")]
    ProviderSend(#[source] anyhow::Error),
    #[error("storage failure")]
    Persistence(#[source] anyhow::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ProviderUnavailable
            | ApiError::ProviderSend(_)
            | ApiError::Persistence(_)
            | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() && !verbose_errors() {
            "something went wrong".to_string()
        } else if status.is_server_error() {
            format!("{self:?}")
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Persistence(e.into())
    }
}

impl From<EmailError> for ApiError {
    fn from(e: EmailError) -> Self {
        match e {
            EmailError::ProviderUnavailable => ApiError::ProviderUnavailable,
            EmailError::SendFailure(source) => ApiError::ProviderSend(source),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized
    }
}

impl From<BroadcastError> for ApiError {
    fn from(e: BroadcastError) -> Self {
        match e {
            BroadcastError::InvalidCampaign(message) => ApiError::Validation(message),
            BroadcastError::NoSubscribers => {
                ApiError::Validation("There are no subscribers to send to.".into())
            }
            BroadcastError::Storage(source) => ApiError::Persistence(source.into()),
            BroadcastError::Render(source) => ApiError::Unexpected(source),
        }
    }
}
