/// Error types for geo-post-service
///
/// Handler failures render as a short plain-text body. The underlying
/// client error is logged here and never sent to the caller.
use crate::services::{AnnotationError, SearchError, StorageError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or undecodable request part
    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to save image to GCS")]
    MediaUpload(#[source] StorageError),

    #[error("Failed to annotate image")]
    Annotation(#[source] AnnotationError),

    #[error("Failed to save post to Elasticsearch")]
    IndexWrite(#[source] SearchError),

    #[error("Failed to read post from Elasticsearch")]
    Search(#[source] SearchError),

    #[error("Failed to read from Elasticsearch")]
    Cluster(#[source] SearchError),
}

impl AppError {
    fn cause(&self) -> Option<String> {
        match self {
            AppError::BadRequest(_) => None,
            AppError::MediaUpload(err) => Some(err.to_string()),
            AppError::Annotation(err) => Some(err.to_string()),
            AppError::IndexWrite(err) | AppError::Search(err) | AppError::Cluster(err) => {
                Some(err.to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MediaUpload(_)
            | AppError::Annotation(_)
            | AppError::IndexWrite(_)
            | AppError::Search(_)
            | AppError::Cluster(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.cause() {
            Some(cause) => tracing::error!(error = %self, cause = %cause, "Request failed"),
            None => tracing::warn!(error = %self, "Rejected request"),
        }

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_text(response: HttpResponse) -> String {
        let bytes = response.into_body().try_into_bytes().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_bad_request_is_400_with_message() {
        let err = AppError::BadRequest("Image is not available".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(err.error_response()), "Image is not available");
    }

    #[test]
    fn test_dependency_errors_hide_cause() {
        let err = AppError::Search(SearchError::Status {
            operation: "search",
            index: "post".into(),
            status: 400,
            body: "parse_exception".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.error_response();
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response), "Failed to read post from Elasticsearch");
    }

    #[test]
    fn test_upload_failure_message() {
        let err = AppError::MediaUpload(StorageError::MissingMediaLink("abc".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to save image to GCS");
    }
}
