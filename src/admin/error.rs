// src/admin/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by admin handlers.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Unknown action or dataset in a form.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
