//! Remote data providers: EIA production statistics and IPEADATA Brent prices.

use reqwest::blocking::{RequestBuilder, Response};

use crate::error::AppError;

pub mod eia;
pub mod ipea;

pub use eia::EiaClient;
pub use ipea::IpeaClient;

/// Request timeout applied to both providers.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Send a request, retrying once on a transport-level failure.
///
/// HTTP error statuses are not retried; they indicate a server-side answer,
/// not a transient transport problem.
pub(crate) fn send_with_retry(req: RequestBuilder) -> Result<Response, AppError> {
    let retry = req.try_clone();
    match req.send() {
        Ok(resp) => Ok(resp),
        Err(first) => match retry {
            Some(req) => req.send().map_err(|e| {
                AppError::Acquisition(format!("request failed after retry: {e} (first: {first})"))
            }),
            None => Err(AppError::Acquisition(format!("request failed: {first}"))),
        },
    }
}
