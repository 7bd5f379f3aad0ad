//! Caller identification for HTTP requests
//!
//! The accept loop tags every request with the address of its peer; methods
//! read it back from the request extensions.

use hyper::HeaderMap;
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Address a request came from, as recorded on runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerAddress(pub String);

impl CallerAddress {
    /// `X-Forwarded-For` when a proxy set it, else the peer IP
    pub fn resolve(headers: &HeaderMap, peer: SocketAddr) -> Self {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match forwarded {
            Some(value) => Self(value.to_string()),
            None => Self(peer.ip().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
