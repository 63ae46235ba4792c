//! Client identity used for rate limiting

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// How callers are told apart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientIdPolicy {
    /// Prefer the first `X-Forwarded-For` entry over the socket peer
    pub trust_forwarded_for: bool,
}

/// Extractor resolving who is calling
///
/// Resolution order:
/// - first entry of `X-Forwarded-For`, only when the policy trusts it
/// - socket peer address, when the server was started with connect info
/// - `"unknown"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    ClientIdPolicy: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = ClientIdPolicy::from_ref(state);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientId(resolve_client_id(&parts.headers, peer, policy)))
    }
}

fn resolve_client_id(headers: &HeaderMap, peer: Option<String>, policy: ClientIdPolicy) -> String {
    let forwarded = if policy.trust_forwarded_for {
        first_forwarded_entry(headers)
    } else {
        None
    };

    forwarded
        .or(peer)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn first_forwarded_entry(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
}
