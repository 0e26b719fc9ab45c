use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No Message Body")]
    MissingBody,
    #[error("No Hmac Signature in Header")]
    MissingSignature,
    #[error("Malformed Hmac Signature in Header")]
    MalformedSignature,
    #[error("Request Failed")]
    SignatureMismatch,
    #[error("Failed to sign identity record")]
    SigningUnavailable,
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            rejected @ (ServerError::MissingBody
            | ServerError::MissingSignature
            | ServerError::MalformedSignature
            | ServerError::SignatureMismatch) => {
                (StatusCode::BAD_REQUEST, rejected.to_string()).into_response()
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something wrong happened.",
            )
                .into_response(),
        }
    }
}
