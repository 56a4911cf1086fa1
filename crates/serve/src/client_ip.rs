//! Client address resolution
//!
//! Requests usually arrive through one or more proxies, so the peer address
//! is only the last resort.

use axum::http::HeaderMap;
use hotsearch_core::types::MAX_IP_LEN;
use std::net::SocketAddr;

/// Headers consulted in order before falling back to the peer address
pub const FORWARDING_HEADERS: [&str; 5] = [
    "x-forwarded-for",
    "proxy-client-ip",
    "wl-proxy-client-ip",
    "http_client_ip",
    "http_x_forwarded_for",
];

/// Placeholder proxies write when they do not know the client
const UNKNOWN: &str = "unknown";

/// Resolves the originating client address of a request
///
/// The first forwarding header that is present, non-empty, not `unknown`
/// and no longer than [`MAX_IP_LEN`] wins; a comma-separated chain resolves
/// to its first entry. Without a usable header the peer address is used, or
/// `unknown` if there is none.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in FORWARDING_HEADERS {
        let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        if let Some(ip) = usable(value) {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn usable(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(UNKNOWN) {
        return None;
    }
    let first = value.split(',').next().unwrap_or(value).trim();
    if first.is_empty() || first.chars().count() > MAX_IP_LEN {
        None
    } else {
        Some(first)
    }
}
