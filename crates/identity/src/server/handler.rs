use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::server::AppState;
use crate::server::signature_header::{SIGNATURE_HEADER, SignatureHeader};
use crate::signing;

/// Serves the canonical identity bytes with their signature in the header.
pub async fn sign_identity(State(state): State<AppState>) -> Result<Response, ServerError> {
    let key = state.keys.signing_key();
    let mac = signing::compute(&state.identity, key.as_bytes())
        .ok_or(ServerError::SigningUnavailable)?;
    let signature = signing::encode_signature(&mac);
    debug!(%signature, "signed identity record");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        [(SIGNATURE_HEADER, signature)],
        state.identity.clone(),
    )
        .into_response())
}

/// Checks the header signature against the raw request body.
///
/// Rejections are reported in order: empty body, missing header, malformed
/// header, mismatch.
pub async fn verify_message(
    State(state): State<AppState>,
    signature: SignatureHeader,
    body: Body,
) -> Result<(StatusCode, &'static str), ServerError> {
    let payload = read_payload(body, state.max_body_bytes).await;
    if payload.is_empty() {
        info!("message body length is zero");
        return Err(ServerError::MissingBody);
    }

    let candidate = match signature {
        SignatureHeader::Present(candidate) => candidate,
        SignatureHeader::Missing => {
            info!("no hmac signature in header");
            return Err(ServerError::MissingSignature);
        }
        SignatureHeader::Malformed(reason) => {
            info!(%reason, "malformed hmac signature in header");
            return Err(ServerError::MalformedSignature);
        }
    };

    let key = state.keys.signing_key();
    if signing::compare(&payload, key.as_bytes(), &candidate) {
        info!(payload_len = payload.len(), "signature matched");
        Ok((StatusCode::OK, "Request Successful"))
    } else {
        info!(payload_len = payload.len(), "signature mismatch");
        Err(ServerError::SignatureMismatch)
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    (StatusCode::OK, "Ok")
}

pub async fn method_not_allowed(method: Method) -> Response {
    reject_method(method, "GET, POST")
}

pub async fn healthcheck_method_not_allowed(method: Method) -> Response {
    reject_method(method, "GET")
}

fn reject_method(method: Method, allow: &'static str) -> Response {
    info!(%method, allow, "unsupported method");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        "Method Not Allowed",
    )
        .into_response()
}

/// Reads the whole body. A failed or oversized read yields no bytes so
/// that a truncated payload can never verify.
async fn read_payload(body: Body, limit: usize) -> Bytes {
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, limit, "failed to read request body, treating as empty");
            Bytes::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_payload_returns_whole_body() {
        let payload = read_payload(Body::from("hello"), 1024).await;
        assert_eq!(&payload[..], b"hello");
    }

    #[tokio::test]
    async fn oversized_body_reads_as_empty() {
        let payload = read_payload(Body::from(vec![b'a'; 64]), 16).await;
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn method_not_allowed_lists_supported_methods() {
        let response = method_not_allowed(Method::PUT).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn healthcheck_only_allows_get() {
        let response = healthcheck_method_not_allowed(Method::POST).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }
}
