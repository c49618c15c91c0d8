use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderMap;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

use payvault_primitives::models::RequestMeta;

/// Closed allow-list of headers contributing to the device fingerprint.
/// Anything outside it (cookies, tracing ids, proxies) must not perturb the
/// session key.
const FINGERPRINT_HEADERS: [&str; 4] = [
    "User-Agent",
    "Content-Type",
    "Host",
    "Grpc-Accept-Encoding",
];

/// Deterministic SHA-256 over the sorted `Name: values` lines of the
/// allow-listed headers. Stable per client device.
pub fn derive_fingerprint(headers: &HeaderMap) -> String {
    let mut lines: Vec<String> = Vec::new();
    for name in FINGERPRINT_HEADERS {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if !values.is_empty() {
            lines.push(format!("{}: {}", name, values.join(",")));
        }
    }
    lines.sort();
    hex::encode(Sha256::digest(lines.join(",").as_bytes()))
}

/// First hop of `x-forwarded-for`, falling back to the transport peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Ingress middleware: derives fingerprint, client IP and user agent for
/// every request and attaches them as an explicit [`RequestMeta`] value.
pub async fn request_meta_middleware(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let fingerprint = derive_fingerprint(req.headers());
    let ip = client_ip(
        req.headers(),
        req.extensions().get::<ConnectInfo<SocketAddr>>(),
    );
    let user_agent = req
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    req.extensions_mut().insert(RequestMeta {
        fingerprint,
        ip,
        user_agent,
    });

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn fingerprint_is_deterministic_and_header_order_free() {
        let mut a = HeaderMap::new();
        a.insert("user-agent", HeaderValue::from_static("curl/8"));
        a.insert("content-type", HeaderValue::from_static("application/json"));

        let mut b = HeaderMap::new();
        b.insert("content-type", HeaderValue::from_static("application/json"));
        b.insert("user-agent", HeaderValue::from_static("curl/8"));

        assert_eq!(derive_fingerprint(&a), derive_fingerprint(&b));
    }

    #[test]
    fn fingerprint_ignores_headers_outside_allow_list() {
        let mut a = HeaderMap::new();
        a.insert("user-agent", HeaderValue::from_static("curl/8"));

        let mut b = a.clone();
        b.insert("x-request-id", HeaderValue::from_static("abc"));
        b.insert("cookie", HeaderValue::from_static("session=zzz"));

        assert_eq!(derive_fingerprint(&a), derive_fingerprint(&b));
    }

    #[test]
    fn fingerprint_changes_with_user_agent() {
        let mut a = HeaderMap::new();
        a.insert("user-agent", HeaderValue::from_static("curl/8"));
        let mut b = HeaderMap::new();
        b.insert("user-agent", HeaderValue::from_static("firefox/131"));
        assert_ne!(derive_fingerprint(&a), derive_fingerprint(&b));
    }

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, None), "1.2.3.4");
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        let headers = HeaderMap::new();
        let peer = ConnectInfo("5.6.7.8:443".parse::<SocketAddr>().unwrap());
        assert_eq!(client_ip(&headers, Some(&peer)), "5.6.7.8");
        assert_eq!(client_ip(&headers, None), "unknown");
    }
}
