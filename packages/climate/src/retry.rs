//! HTTP retry for transient errors.
//!
//! Connection failures, timeouts, HTTP 429 and 5xx responses are retried
//! with exponential backoff. Every other response, including 4xx, is
//! returned to the caller, which decides what a missing file means.

use std::time::Duration;

use crate::FetchError;

/// Retries after the first attempt (2s, 4s, 8s, 16s backoff).
pub const MAX_RETRIES: u32 = 4;

/// Sends the request built by `build_request`, retrying transient
/// failures. Builders are consumed by `send`, so a fresh one is built per
/// attempt.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the request still fails after all
/// retries, or [`FetchError::Status`] if the server keeps answering 429 or
/// 5xx.
#[allow(clippy::future_not_send)]
pub async fn send<F>(build_request: F, max_retries: u32) -> Result<reqwest::Response, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(FetchError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {}", response.url());
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::Status {
                        url: response.url().to_string(),
                        status: status.as_u16(),
                    });
                }
                return Ok(response);
            }
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}
