//! HTTP proxy adapter: forwards one [`SimRequest`]'s payload to a backend
//! node and turns the outcome into a [`SimResponse`].

use plb_core::error::{ProxyError, TransportStage};
use plb_core::{SimRequest, SimResponse};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Sends `req`'s payload to `uri` over `client`, bounded by `timeout` and
/// racing the request's own cancellation token.
///
/// The timeout passed in is already the resolved `min(ctx deadline,
/// ProxyRequestTimeout)` value — callers are expected to have called
/// [`SimRequest::outbound_deadline`] first.
pub async fn proxy_request(
    client: &reqwest::Client,
    uri: &str,
    req: &SimRequest,
    timeout: Duration,
    cancel: &CancellationToken,
) -> SimResponse {
    let started = Instant::now();

    let send_fut = client
        .post(uri)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .body(req.payload().clone())
        .send();

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return SimResponse::failure(ProxyError::Cancelled, uri.to_string(), started.elapsed());
        }
        result = tokio::time::timeout(timeout, send_fut) => result,
    };

    let elapsed = started.elapsed();

    let response = match outcome {
        Err(_elapsed) => {
            return SimResponse::failure(
                ProxyError::ProxyTimeout {
                    node_uri: uri.to_string(),
                },
                uri.to_string(),
                elapsed,
            );
        }
        Ok(Err(err)) => {
            return SimResponse::failure(
                ProxyError::ProxyTransport {
                    node_uri: uri.to_string(),
                    stage: TransportStage::Sending,
                    message: err.to_string(),
                },
                uri.to_string(),
                elapsed,
            );
        }
        Ok(Ok(response)) => response,
    };

    let status = response.status();

    let body_fut = response.bytes();
    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return SimResponse::failure(ProxyError::Cancelled, uri.to_string(), started.elapsed());
        }
        result = body_fut => result,
    };

    let body = match body {
        Ok(bytes) => bytes,
        Err(err) => {
            return SimResponse::failure(
                ProxyError::ProxyTransport {
                    node_uri: uri.to_string(),
                    stage: TransportStage::Decoding,
                    message: err.to_string(),
                },
                uri.to_string(),
                started.elapsed(),
            );
        }
    };

    if status.as_u16() >= 400 {
        return SimResponse::failure(
            ProxyError::ProxyStatusError {
                node_uri: uri.to_string(),
                status: status.as_u16(),
                body,
            },
            uri.to_string(),
            started.elapsed(),
        );
    }

    SimResponse::success(body, status.as_u16(), uri.to_string(), started.elapsed(), Instant::now())
}
