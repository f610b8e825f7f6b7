use thiserror::Error;
use url::Url;

/// Errors that can occur while validating an item service base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// Query strings and fragments would be clobbered by endpoint joins.
    #[error("Base URL must not carry a query or fragment")]
    HasQueryOrFragment,
}

/// Validate and normalize the base URL of an item service.
///
/// The returned URL always ends with `/`, so relative endpoint paths such as
/// `items` join underneath it instead of replacing its last segment.
///
/// # Examples
///
/// ```
/// use storefeed::util::validate_base_url;
///
/// let url = validate_base_url("https://api.example.com/v1").unwrap();
/// assert_eq!(url.join("items").unwrap().as_str(), "https://api.example.com/v1/items");
///
/// assert!(validate_base_url("ftp://example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::HasQueryOrFragment);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
