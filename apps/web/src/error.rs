use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use formloom_core::AppError;
use formloom_markup::{Page, render_page};

/// Web error wrapper around core application errors.
#[derive(Debug)]
pub struct WebError(pub AppError);

impl From<AppError> for WebError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let page = render_page(&Page {
            title: "Something went wrong".to_owned(),
            flash_lines: vec![self.0.to_string()],
            body: String::new(),
        });

        (status, Html(page)).into_response()
    }
}

/// Standard web handler result type.
pub type WebResult<T> = Result<T, WebError>;
