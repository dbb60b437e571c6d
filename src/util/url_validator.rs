use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors raised while validating the configured API base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain http would send the API token in the clear.
    #[error("Insecure API URL: HTTPS required (except localhost)")]
    InsecureScheme,
    #[error("API URL has no host")]
    MissingHost,
}

/// Validate and normalize the base URL of the blog API.
///
/// - Only `http` and `https` are accepted.
/// - `http` is only allowed for loopback hosts (local development servers).
/// - The returned URL always ends with `/`, so relative endpoint paths join
///   beneath it instead of replacing its last segment.
///
/// ```
/// use blogdesk::util::validate_base_url;
///
/// let url = validate_base_url("https://blog.example.com/api").unwrap();
/// assert_eq!(url.as_str(), "https://blog.example.com/api/");
///
/// assert!(validate_base_url("http://localhost:8080").is_ok());
/// assert!(validate_base_url("http://blog.example.com").is_err());
/// assert!(validate_base_url("ftp://blog.example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    let host = url.host_str().ok_or(UrlValidationError::MissingHost)?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback_host(host) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS API base URL (localhost only)");
        }
        "http" => return Err(UrlValidationError::InsecureScheme),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn is_loopback_host(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }
    // IPv6 hosts come back bracketed
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_accepted() {
        let url = validate_base_url("https://blog.example.com").unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/");
    }

    #[test]
    fn test_trailing_slash_added_to_path() {
        let url = validate_base_url("https://example.com/v1/admin").unwrap();
        assert_eq!(url.join("articles").unwrap().path(), "/v1/admin/articles");
    }

    #[test]
    fn test_existing_slash_untouched() {
        let url = validate_base_url("https://example.com/api/").unwrap();
        assert_eq!(url.path(), "/api/");
    }

    #[test]
    fn test_http_loopback_allowed() {
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("http://127.0.0.1:3000/api").is_ok());
        assert!(validate_base_url("http://[::1]:3000").is_ok());
    }

    #[test]
    fn test_http_remote_rejected() {
        let err = validate_base_url("http://blog.example.com").unwrap_err();
        assert!(matches!(err, UrlValidationError::InsecureScheme));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_base_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_base_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
