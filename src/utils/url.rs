//! Endpoint URL helpers.

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use blogchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/generate"),
///     "http://localhost:8000/generate"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

/// Checks that `base_url` is an absolute http(s) URL with a host.
pub fn validate_base_url(base_url: &str) -> Result<(), String> {
    let trimmed = base_url.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| format!("'{trimmed}' must start with http:// or https://"))?;

    if rest.split('/').next().unwrap_or_default().is_empty() {
        return Err(format!("'{trimmed}' has no host"));
    }
    Ok(())
}
