//! URL modeling and filename derivation for fetched files.

mod path;

pub use path::filename_from_url_path;

/// Filename used when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "downloaded_file";

/// Derives the local file name for `url`: its last path segment, or
/// [`DEFAULT_FILENAME`] when the path is empty or ends in `/`.
///
/// # Examples
///
/// - `https://example.com/archive.tar.gz` → `"archive.tar.gz"`
/// - `https://example.com/` → `"downloaded_file"`
pub fn derive_filename(url: &url::Url) -> String {
    filename_from_url_path(url)
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}
