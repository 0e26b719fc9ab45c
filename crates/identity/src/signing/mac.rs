use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Output size of HMAC-SHA256 in bytes.
pub const MAC_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Computes HMAC-SHA256 of `payload` under `key`.
///
/// An empty key is treated as absent rather than as a zero-length secret,
/// and there is nothing to authenticate in an empty payload. Both yield
/// `None`.
pub fn compute(payload: &[u8], key: &[u8]) -> Option<[u8; MAC_LEN]> {
    if key.is_empty() || payload.is_empty() {
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().into())
}

/// Checks `candidate` against the MAC of `payload` under `key`.
///
/// The comparison runs in constant time over the expected MAC, so a
/// mismatch does not reveal how many leading bytes were correct.
pub fn compare(payload: &[u8], key: &[u8], candidate: &[u8]) -> bool {
    if key.is_empty() || candidate.is_empty() {
        return false;
    }

    match compute(payload, key) {
        Some(expected) => expected[..].ct_eq(candidate).into(),
        None => false,
    }
}

/// Header encoding of a MAC: padded standard base64.
pub fn encode_signature(mac: &[u8]) -> String {
    STANDARD.encode(mac)
}

pub fn decode_signature(encoded: &str) -> Result<Vec<u8>, SignatureError> {
    Ok(STANDARD.decode(encoded.trim())?)
}
