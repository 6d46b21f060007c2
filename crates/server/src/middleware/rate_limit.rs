//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the credential endpoints (`/signup`, `/login`) are limited. The
//! limiter keys on the peer address, and on forwarding headers only when
//! that peer is a configured proxy.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that resolves the client IP behind trusted proxies.
///
/// A request arriving straight from a client is keyed on the peer address,
/// whatever headers it carries. When the peer is one of the trusted
/// proxies, `CF-Connecting-IP` is used, then the rightmost untrusted
/// `X-Forwarded-For` hop, then `X-Real-IP`.
#[derive(Debug, Clone)]
pub struct ProxyIpKeyExtractor {
    trusted: Arc<[IpAddr]>,
}

impl ProxyIpKeyExtractor {
    #[must_use]
    pub fn new(trusted: &[IpAddr]) -> Self {
        Self {
            trusted: trusted.into(),
        }
    }

    fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted.contains(&ip)
    }

    /// Client address for a request received from `peer`.
    fn client_ip(&self, peer: IpAddr, headers: &HeaderMap) -> IpAddr {
        if !self.is_trusted(peer) {
            return peer;
        }

        if let Some(ip) = header_ip(headers, "cf-connecting-ip") {
            return ip;
        }

        // Hops are appended left to right; everything left of the first
        // untrusted hop from the right is client-controlled.
        let hops: Vec<&str> = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .collect();
        for hop in hops.iter().rev() {
            match hop.parse::<IpAddr>() {
                Ok(ip) if self.is_trusted(ip) => {}
                Ok(ip) => return ip,
                Err(_) => break,
            }
        }

        header_ip(headers, "x-real-ip").unwrap_or(peer)
    }
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let Some(ConnectInfo(peer)) = req.extensions().get::<ConnectInfo<SocketAddr>>() else {
            return Err(GovernorError::UnableToExtractKey);
        };
        Ok(self.client_ip(peer.ip(), req.headers()))
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
///
/// Uses `ProxyIpKeyExtractor` to get the real client IP.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Turn a limiter error into the API's JSON error shape.
///
/// `Retry-After` from the limiter is kept on 429 responses.
fn rate_limit_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::info!(wait_time, "auth rate limit exceeded");
            let mut response = AppError::RateLimited.into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("rate limiter found no peer address".to_string()).into_response()
        }
        GovernorError::Other { code, msg, .. } => AppError::Internal(format!(
            "rate limiter failed with {code}: {}",
            msg.unwrap_or_default()
        ))
        .into_response(),
    }
}

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// Applied to `/signup` and `/login` against password guessing.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trusted_proxies: &[IpAddr]) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor::new(trusted_proxies))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rate_limit_response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{StatusCode, header},
        routing::post,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tower_governor::key_extractor::KeyExtractor;

    const PROXY: &str = "10.0.0.2";

    fn extractor() -> ProxyIpKeyExtractor {
        ProxyIpKeyExtractor::new(&[PROXY.parse().unwrap()])
    }

    fn request(peer: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::post("/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr = SocketAddr::new(peer.parse().unwrap(), 51000);
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn test_direct_client_cannot_spoof_headers() {
        let req = request(
            "192.0.2.7",
            &[
                ("cf-connecting-ip", "203.0.113.9"),
                ("x-forwarded-for", "198.51.100.4"),
                ("x-real-ip", "198.51.100.5"),
            ],
        );
        let ip = extractor().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.7");
    }

    #[test]
    fn test_cloudflare_header_wins_behind_proxy() {
        let req = request(
            PROXY,
            &[
                ("x-forwarded-for", "198.51.100.4"),
                ("cf-connecting-ip", "203.0.113.9"),
            ],
        );
        let ip = extractor().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.9");
    }

    #[test]
    fn test_rightmost_untrusted_forwarded_hop() {
        // The client prepended a fake hop; the proxy appended the real one.
        let req = request(
            PROXY,
            &[("x-forwarded-for", "1.2.3.4, 198.51.100.4, 10.0.0.2")],
        );
        let ip = extractor().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_proxy_without_headers_keys_on_proxy() {
        let ip = extractor().extract(&request(PROXY, &[])).unwrap();
        assert_eq!(ip.to_string(), PROXY);
    }

    #[test]
    fn test_missing_peer_address_is_an_error() {
        let req = Request::post("/login")
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        assert!(matches!(
            extractor().extract(&req),
            Err(GovernorError::UnableToExtractKey)
        ));
    }

    #[tokio::test]
    async fn test_limited_requests_get_a_json_429() {
        let app = Router::new()
            .route("/login", post(|| async { StatusCode::NO_CONTENT }))
            .route_layer(auth_rate_limiter(&[]));

        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(request("192.0.2.7", &[]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        // A forged header does not buy a fresh bucket.
        let response = app
            .clone()
            .oneshot(request("192.0.2.7", &[("x-forwarded-for", "203.0.113.50")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Too many requests, please slow down" }));

        // Other clients are unaffected.
        let response = app.oneshot(request("192.0.2.8", &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
