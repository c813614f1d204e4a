use thiserror::Error;
use url::Url;

/// Why an item link cannot be fetched.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The link string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The link uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Parses an item link and checks that it can be fetched over HTTP(S).
///
/// Surrounding whitespace is ignored, since feeds often pretty-print
/// `<link>` contents across lines.
///
/// ```
/// use notefeed::util::parse_http_url;
///
/// assert!(parse_http_url("https://note.com/x/n/abc").is_ok());
/// assert!(parse_http_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_http_url(link: &str) -> Result<Url, LinkError> {
    let url = Url::parse(link.trim())?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(parse_http_url("https://example.com/post").is_ok());
        assert!(parse_http_url("http://127.0.0.1:8080/post").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let url = parse_http_url("\n  https://example.com/post\n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/post");
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            parse_http_url("file:///etc/passwd"),
            Err(LinkError::UnsupportedScheme(_))
        ));
        assert!(parse_http_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_relative_link_rejected() {
        assert!(matches!(
            parse_http_url("/n/abc"),
            Err(LinkError::InvalidUrl(_))
        ));
    }
}
