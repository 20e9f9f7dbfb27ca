//! Helpers for building backend URLs.

/// Backend base URL derived from the current window location.
///
/// The backend listens on port 3000 of the host that served the page.
/// Returns an empty string outside the browser.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:3000", protocol, hostname)
}

/// Full URL for an `/api/...` path, e.g. `api_url("/api/grid/materials/columns")`.
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
