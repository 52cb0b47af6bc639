//! Configuration value parsing and validation helpers

use std::time::Duration;

use url::Url;

/// Parse a duration string like "30s", "5m", "1h30m"
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let mut total_seconds: u64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else {
            let num: u64 = current_num
                .parse()
                .map_err(|_| format!("Invalid number in duration: {}", s))?;
            current_num.clear();

            let unit: u64 = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Unknown duration unit: {}", c)),
            };
            total_seconds = num
                .checked_mul(unit)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
        }
    }

    if !current_num.is_empty() {
        return Err(format!("Missing unit in duration: {}", s));
    }

    if total_seconds == 0 {
        return Err(format!("Invalid duration: {}", s));
    }

    Ok(Duration::from_secs(total_seconds))
}

/// Parse the backend origin. Only absolute http(s) URLs without a query or
/// fragment are accepted, since API prefixes and media paths are appended to it.
pub fn parse_origin(s: &str) -> Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("Invalid origin {:?}: {}", s, e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("Origin must be http or https, got: {}", other)),
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(format!("Origin has no host: {}", s));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("Origin must not carry a query or fragment: {}", s));
    }
    Ok(url)
}

/// Normalize a route prefix: empty stays empty, otherwise exactly one leading
/// slash and no trailing slash.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
