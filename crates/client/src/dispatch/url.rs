//! Page URL checks for capture injection.

/// Error type for page URLs the capture agent cannot run on.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a tab URL and accept it only for `http` and `https` pages.
///
/// Unlike cache lookups, nothing is normalized: the URL is parsed as given.
pub fn parse_page_url(input: &str) -> Result<url::Url, UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(input).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Whether a capture agent may be injected into a tab showing `url`.
pub fn is_injectable_url(url: Option<&str>) -> bool {
    url.is_some_and(|u| parse_page_url(u).is_ok())
}
