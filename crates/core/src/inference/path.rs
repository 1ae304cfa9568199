//! Field path helpers
//!
//! Paths are dot-delimited (`address.city`). Traversal into array elements is
//! written with an `[]` marker on the array segment (`items[].sku`).

/// Marker appended to an array segment when descending into its elements
pub const ARRAY_MARKER: &str = "[]";

/// Join a parent path and a key
pub fn join(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    }
}

/// Path of the elements of the array at `path`
pub fn elements(path: &str) -> String {
    format!("{path}{ARRAY_MARKER}")
}

/// The last key of a path, without array markers
///
/// `items[].product_id` → `product_id`, `tags[]` → `tags`
pub fn last_segment(path: &str) -> &str {
    let segment = path.rsplit('.').next().unwrap_or(path);
    let mut segment = segment;
    while let Some(stripped) = segment.strip_suffix(ARRAY_MARKER) {
        segment = stripped;
    }
    segment
}

/// The container path of `path`, `None` for top-level fields
pub fn parent(path: &str) -> Option<&str> {
    path.rfind('.').map(|idx| &path[..idx])
}

/// Whether `path` equals `prefix` or lies underneath it
///
/// Matching only happens at segment boundaries, so `address` covers
/// `address.city` and `address[].city` but not `addressLine`.
pub fn is_within(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with(ARRAY_MARKER),
        None => false,
    }
}
