use url::Url;

/// Truncate a string to at most `max_bytes` bytes without splitting a multi-byte
/// character. Returns the original string if it already fits.
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Resolve a media path returned by the backend into a playable URL.
///
/// The render endpoint returns paths like `/static/sessions/x/final_video.mp4`
/// that live under the backend origin; the agent endpoint already returns
/// absolute URLs. Anything that parses with a scheme is kept as is; every
/// other value is appended to the origin, path included, the same way the
/// API base is built.
pub fn resolve_media_url(origin: &Url, path: &str) -> String {
    if let Ok(absolute) = Url::parse(path) {
        return absolute.to_string();
    }
    let root = origin.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", root, path)
    } else {
        format!("{}/{}", root, path)
    }
}
