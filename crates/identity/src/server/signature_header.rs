use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use crate::signing::decode_signature;

/// Header carrying the base64 HMAC-SHA256 of the payload.
pub const SIGNATURE_HEADER: &str = "x-hmac-signature";

/// Outcome of reading the signature header.
///
/// Extraction never rejects, so the handler decides the order in which an
/// absent body and an absent header are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureHeader {
    Missing,
    Malformed(String),
    Present(Vec<u8>),
}

impl SignatureHeader {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers.get(SIGNATURE_HEADER) else {
            return Self::Missing;
        };
        let Ok(value) = value.to_str() else {
            return Self::Malformed("header value is not visible ASCII".to_string());
        };
        if value.trim().is_empty() {
            return Self::Missing;
        }

        match decode_signature(value) {
            Ok(bytes) => Self::Present(bytes),
            Err(err) => Self::Malformed(err.to_string()),
        }
    }
}

impl<S> FromRequestParts<S> for SignatureHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static [u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_bytes(value).unwrap());
        headers
    }

    #[test]
    fn absent_header_is_missing() {
        assert_eq!(SignatureHeader::from_headers(&HeaderMap::new()), SignatureHeader::Missing);
    }

    #[test]
    fn empty_header_is_missing() {
        assert_eq!(SignatureHeader::from_headers(&headers_with(b"")), SignatureHeader::Missing);
    }

    #[test]
    fn valid_base64_is_decoded() {
        let header = SignatureHeader::from_headers(&headers_with(b"AQID"));
        assert_eq!(header, SignatureHeader::Present(vec![1, 2, 3]));
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("X-HMAC-Signature", HeaderValue::from_static("AQID"));
        assert_eq!(
            SignatureHeader::from_headers(&headers),
            SignatureHeader::Present(vec![1, 2, 3])
        );
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let header = SignatureHeader::from_headers(&headers_with(b"%%%not-base64%%%"));
        assert!(matches!(header, SignatureHeader::Malformed(_)));
    }

    #[test]
    fn non_ascii_value_is_malformed() {
        let header = SignatureHeader::from_headers(&headers_with(b"\xfe\xff"));
        assert!(matches!(header, SignatureHeader::Malformed(_)));
    }
}
