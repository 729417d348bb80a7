//! Request identity: id for log correlation plus the real client address.
//!
//! An incoming `X-Request-Id` is kept when it looks sane, otherwise a UUID v4
//! is minted. The client address prefers proxy headers (`True-Client-IP`,
//! `X-Real-IP`, first hop of `X-Forwarded-For`) over the socket peer.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{field, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_INCOMING_ID_LEN: usize = 128;

/// Identity attached to every request's extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub client_ip: Option<IpAddr>,
}

pub async fn tag(mut req: Request, next: Next) -> Response {
    let request_id = incoming_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = forwarded_ip(req.headers()).or(peer);

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        client_ip = field::Empty,
    );
    if let Some(ip) = client_ip {
        span.record("client_ip", field::display(ip));
    }

    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
        client_ip,
    });

    let mut resp = next.run(req).instrument(span).await;
    if let Ok(v) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    resp
}

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let sane = !raw.is_empty()
        && raw.len() <= MAX_INCOMING_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    sane.then(|| raw.to_owned())
}

/// Client address from proxy headers, if any parse.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    single_ip(headers, "true-client-ip")
        .or_else(|| single_ip(headers, "x-real-ip"))
        .or_else(|| {
            let xff = headers.get("x-forwarded-for")?.to_str().ok()?;
            xff.split(',').next()?.trim().parse().ok()
        })
}

fn single_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.insert(*k, HeaderValue::from_static(v));
        }
        h
    }

    #[test]
    fn first_forwarded_hop_wins() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(forwarded_ip(&h), "203.0.113.7".parse().ok());
    }

    #[test]
    fn real_ip_beats_forwarded_for() {
        let h = headers(&[
            ("x-real-ip", "198.51.100.2"),
            ("x-forwarded-for", "203.0.113.7"),
        ]);
        assert_eq!(forwarded_ip(&h), "198.51.100.2".parse().ok());
    }

    #[test]
    fn garbage_is_ignored() {
        let h = headers(&[("x-forwarded-for", "not-an-ip")]);
        assert_eq!(forwarded_ip(&h), None);
    }

    #[test]
    fn incoming_id_must_be_sane() {
        assert_eq!(
            incoming_id(&headers(&[("x-request-id", "abc-123")])).as_deref(),
            Some("abc-123")
        );
        assert_eq!(incoming_id(&headers(&[("x-request-id", "has space")])), None);
        assert_eq!(incoming_id(&HeaderMap::new()), None);
    }
}
