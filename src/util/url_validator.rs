use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use url::{Host, Url};

/// Reasons a feed URL is refused before any request is made.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(IpAddr),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a URL given on the command line as a feed source.
///
/// Only `http` and `https` are accepted. Unless `allow_private` is set, the
/// host must not be `localhost` (or a `*.localhost` name), a loopback
/// address, or an address in a private, link-local, unspecified or
/// unique-local range. IPv4-mapped IPv6 addresses are checked as the IPv4
/// address they wrap.
///
/// Host names are not resolved, so a public name pointing at a private
/// address passes.
///
/// # Examples
///
/// ```
/// use feedparse::util::validate_url;
///
/// let url = validate_url("https://example.com/feed.xml", false).unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_url("http://localhost/feed", false).is_err());
/// assert!(validate_url("http://192.168.1.1/feed", false).is_err());
/// assert!(validate_url("http://192.168.1.1/feed", true).is_ok());
/// assert!(validate_url("file:///etc/passwd", true).is_err());
/// ```
pub fn validate_url(url_str: &str, allow_private: bool) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    let host = url.host().ok_or(UrlValidationError::MissingHost)?;
    if allow_private {
        return Ok(url);
    }

    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return Err(UrlValidationError::Localhost);
            }
        }
        Host::Ipv4(ip) => check_ip(IpAddr::V4(ip))?,
        Host::Ipv6(ip) => check_ip(IpAddr::V6(ip))?,
    }

    Ok(url)
}

fn check_ip(ip: IpAddr) -> Result<(), UrlValidationError> {
    let ip = match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    };
    if ip.is_loopback() {
        return Err(UrlValidationError::Localhost);
    }
    let private = match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    };
    if private {
        return Err(UrlValidationError::PrivateIp(ip));
    }
    Ok(())
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    // fc00::/7 unique local, fe80::/10 link-local
    ip.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_urls_accepted() {
        assert!(validate_url("https://example.com/feed.xml", false).is_ok());
        assert!(validate_url("http://news.example.org", false).is_ok());
        assert!(validate_url("https://example.com:443/feed.xml", false).is_ok());
        assert!(validate_url("http://93.184.216.34/rss", false).is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        for url in ["file:///etc/passwd", "ftp://example.com", "gopher://example.com"] {
            assert!(matches!(
                validate_url(url, true),
                Err(UrlValidationError::UnsupportedScheme(_))
            ));
        }
    }

    #[test]
    fn test_unparseable_url() {
        assert!(matches!(
            validate_url("not a url", false),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_localhost_rejected() {
        for url in [
            "http://localhost/feed",
            "http://LOCALHOST./feed",
            "http://app.localhost/feed",
            "http://127.0.0.1/feed",
            "http://[::1]/feed",
        ] {
            assert!(
                matches!(validate_url(url, false), Err(UrlValidationError::Localhost)),
                "{url}"
            );
        }
    }

    #[test]
    fn test_private_ranges_rejected() {
        for url in [
            "http://192.168.1.1/feed",
            "http://10.0.0.1:3000/feed",
            "http://172.16.0.1/feed",
            "http://169.254.1.1/feed",
            "http://0.0.0.0/feed",
            "http://[fe80::1]/feed",
            "http://[fd00::1]/feed",
            "http://[::ffff:10.0.0.1]/feed",
        ] {
            assert!(
                matches!(validate_url(url, false), Err(UrlValidationError::PrivateIp(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_allow_private_skips_host_checks() {
        let url = validate_url("http://127.0.0.1:8080/feed", true).unwrap();
        assert_eq!(url.port(), Some(8080));
        assert!(validate_url("http://localhost/feed", true).is_ok());
    }
}
