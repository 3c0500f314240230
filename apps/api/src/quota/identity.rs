//! Client identity derivation for quota partitioning.
//!
//! Prefers the first `x-forwarded-for` entry over the peer address. This is
//! a deliberate, simple heuristic: it is not spoof-resistant, which is fine
//! because the quota is advisory rather than a security boundary.

use std::net::SocketAddr;

use axum::http::HeaderMap;

pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
