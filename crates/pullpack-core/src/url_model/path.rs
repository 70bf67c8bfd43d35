//! Filename extraction from URL path.

/// Returns the final segment of `url`'s path (text after the last `/`).
///
/// Query and fragment are ignored. Returns `None` when that segment is empty
/// (root path, path ending in `/`) or is a dot segment.
pub fn filename_from_url_path(url: &url::Url) -> Option<&str> {
    let segment = url.path().rsplit('/').next()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}
