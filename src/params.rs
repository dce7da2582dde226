//! Query-parameter extraction for Bus Tracker URLs
//!
//! Only used to derive offline cache file names, so the lookup is a plain
//! substring scan rather than a full URL parse.

/// Sentinel returned by [`url_param`] when a parameter cannot be extracted
pub const NOT_FOUND: &str = "-1";

/// Key label for the route identifier
pub const ROUTE_KEY: &str = "rt=";

/// Key label for the stop identifier
pub const STOP_KEY: &str = "stpid=";

const DELIMITER: char = '&';

/// Finds the value following the first occurrence of `key` in `url`.
///
/// The value runs up to the next `&`. A parameter at the end of the URL with
/// no trailing `&` is reported as missing.
///
/// # Examples
/// ```
/// use ctaweb::params::find_param;
///
/// let url = "http://host/api?key=X&rt=20&stpid=456&format=json";
/// assert_eq!(find_param(url, "rt="), Some("20"));
/// assert_eq!(find_param(url, "format="), None);
/// ```
pub fn find_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let pos = url.find(key)?;
    let start = pos + key.len();
    let len = url[start..].find(DELIMITER)?;
    Some(&url[start..start + len])
}

/// Returns the value for `key`, or [`NOT_FOUND`] when it cannot be extracted.
pub fn url_param(url: &str, key: &str) -> String {
    find_param(url, key).unwrap_or(NOT_FOUND).to_string()
}
