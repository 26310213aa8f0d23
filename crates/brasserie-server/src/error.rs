//! Page-level error handling.
//!
//! Model and rendering failures propagate up to this boundary, which maps
//! them to a status code and a rendered error page. Errors without a more
//! specific status present as internal errors.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use brasserie_models::StoreError;

/// The generic error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

/// An error that renders as the generic error page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A model operation failed; the status comes from the error kind.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request carried a form value the page could not use.
    #[error("{0}")]
    BadRequest(String),

    /// A template failed to render.
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    /// The blocking task running a model call was cancelled or panicked.
    #[error("request task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::Store(e) => {
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            PageError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PageError::Render(_) | PageError::TaskJoin(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Log the real cause; never leak it into the page.
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        render_error_page(status, message)
    }
}

/// Renders the error template for the given status and message.
///
/// If the error template itself fails to render, falls back to plain text so
/// the client still receives the status.
pub fn render_error_page(status: StatusCode, message: String) -> Response {
    let template = ErrorTemplate {
        status: status.as_u16(),
        message: message.clone(),
    };
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error template failed to render");
            (status, message).into_response()
        }
    }
}
