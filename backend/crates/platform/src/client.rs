//! Client identification utilities
//!
//! Derives the rate-limit client key from HTTP headers and the peer address.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract client IP address
///
/// The direct connection IP is the client unless it belongs to a trusted
/// proxy. Only then is `X-Forwarded-For` consulted, walking it from the
/// right and skipping further trusted hops; the first untrusted address is
/// the client. Entries a caller prepends itself are never reached.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
/// * `trusted_proxies` - Addresses of reverse proxies in front of the service
///
/// ## Returns
/// The client IP address, or None if there is no direct connection IP
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = direct_ip?;
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) else {
        return Some(peer);
    };

    let mut client = peer;
    for hop in xff.rsplit(',') {
        let Ok(ip) = hop.trim().parse::<IpAddr>() else {
            break;
        };
        client = ip;
        if !trusted_proxies.contains(&ip) {
            break;
        }
    }
    Some(client)
}

/// Client key used to bucket rate-limit counters
///
/// Empty when the client cannot be identified; the rate limiter rejects
/// an empty key.
pub fn client_key(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted_proxies: &[IpAddr],
) -> String {
    extract_client_ip(headers, direct_ip, trusted_proxies)
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn xff(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_untrusted_peer_ignores_xff() {
        let headers = xff("192.168.1.1, 10.0.0.1");
        assert_eq!(
            extract_client_ip(&headers, Some(ip("198.51.100.77")), &[]),
            Some(ip("198.51.100.77"))
        );
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_untrusted_hop() {
        let proxies = [ip("10.0.0.1"), ip("10.0.0.2")];
        // Caller forged the first entry; the proxies appended the real one
        let headers = xff("1.2.3.4, 203.0.113.7, 10.0.0.2");

        assert_eq!(
            extract_client_ip(&headers, Some(ip("10.0.0.1")), &proxies),
            Some(ip("203.0.113.7"))
        );
    }

    #[test]
    fn test_trusted_proxy_without_usable_xff() {
        let proxies = [ip("10.0.0.1")];
        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(ip("10.0.0.1")), &proxies),
            Some(ip("10.0.0.1"))
        );
        assert_eq!(
            extract_client_ip(&xff("unknown"), Some(ip("10.0.0.1")), &proxies),
            Some(ip("10.0.0.1"))
        );
    }

    #[test]
    fn test_no_peer_is_unidentified() {
        assert_eq!(extract_client_ip(&xff("203.0.113.7"), None, &[]), None);
    }

    #[test]
    fn test_client_key() {
        let headers = HeaderMap::new();

        assert_eq!(client_key(&headers, Some(ip("127.0.0.1")), &[]), "127.0.0.1");
        assert_eq!(client_key(&headers, None, &[]), "");
    }
}
