use anyhow::{Context, Result};
use bytes::Bytes;
use http::{Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use tracing::{debug, info};

use signed_identity::{SIGNATURE_HEADER, SigningKey, signing};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("GET returned {0}")]
    UnexpectedStatus(StatusCode),
    #[error("GET response carried no x-hmac-signature header")]
    MissingSignature,
}

/// Result of fetching the signed record and posting it back.
#[derive(Debug)]
pub struct RoundTrip {
    pub payload: Bytes,
    pub signature: String,
    /// Whether the signature checks out under the local copy of the key.
    pub locally_verified: bool,
    pub status: StatusCode,
    pub verdict: String,
}

impl RoundTrip {
    pub fn accepted(&self) -> bool {
        self.locally_verified && self.status == StatusCode::OK
    }
}

/// Fetches the signed identity, verifies it with `key`, then posts the
/// exact bytes and signature back for the server to verify.
pub async fn run(host: &str, port: u16, key: &SigningKey) -> Result<RoundTrip> {
    let uri: Uri = format!("http://{host}:{port}/")
        .parse()
        .context("building server uri")?;
    let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();

    let request = Request::get(uri.clone())
        .body(Full::new(Bytes::new()))
        .context("building GET request")?;
    let response = client.request(request).await.context("sending GET request")?;
    if response.status() != StatusCode::OK {
        return Err(ClientError::UnexpectedStatus(response.status()).into());
    }

    let signature = response
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(ClientError::MissingSignature)?
        .to_string();
    let payload = response
        .into_body()
        .collect()
        .await
        .context("reading GET body")?
        .to_bytes();
    debug!(%signature, payload_len = payload.len(), "received signed identity");

    let locally_verified = signing::decode_signature(&signature)
        .map(|candidate| signing::compare(&payload, key.as_bytes(), &candidate))
        .unwrap_or(false);
    info!(locally_verified, "checked signature locally");

    let request = Request::post(uri)
        .header(SIGNATURE_HEADER, &signature)
        .body(Full::new(payload.clone()))
        .context("building POST request")?;
    let response = client.request(request).await.context("sending POST request")?;
    let status = response.status();
    let verdict = response
        .into_body()
        .collect()
        .await
        .context("reading POST body")?
        .to_bytes();
    let verdict = String::from_utf8_lossy(&verdict).into_owned();
    info!(%status, %verdict, "server verdict");

    Ok(RoundTrip {
        payload,
        signature,
        locally_verified,
        status,
        verdict,
    })
}
