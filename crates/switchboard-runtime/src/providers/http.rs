//! Shared HTTP plumbing for the adapters.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Duration;

use super::ProviderError;

/// Longest error body excerpt kept in an [`ProviderError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Connection pool shared by every adapter.
///
/// Timeouts are set per request, so the client itself has none.
pub(crate) fn client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Send a JSON POST and decode a 2xx JSON reply.
///
/// Any deviation (transport error, timeout, non-2xx, undecodable body)
/// comes back as a [`ProviderError`].
pub(crate) async fn post_json<B, R>(
    request: reqwest::RequestBuilder,
    body: &B,
    timeout: Duration,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: excerpt(&bytes),
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// The request URL is dropped from the message: some providers carry the
/// key in the query string.
fn transport_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Http(error.without_url().to_string())
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
