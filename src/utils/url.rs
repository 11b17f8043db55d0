//! Endpoint URL assembly.
//!
//! Base URLs come from config files and environment variables where trailing
//! slashes are common; joining must not produce `//` in the path.

/// Strip trailing slashes from a base URL.
///
/// ```
/// use palaver::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://abc.supabase.co/"), "https://abc.supabase.co");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use palaver::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://abc.supabase.co/", "/rest/v1/messages"),
///     "https://abc.supabase.co/rest/v1/messages"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    if endpoint.is_empty() {
        base
    } else {
        format!("{base}/{endpoint}")
    }
}

/// True when the value looks like an absolute http(s) URL.
pub fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}
