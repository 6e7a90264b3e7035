//! Flat-file naming for page records
//!
//! `url_to_filename` strips a leading `https://` or `http://`, keeps every
//! alphanumeric character and replaces everything else with `_`.
//! `filename_to_url` undoes this as far as it can: it replaces every `_`
//! with `/` and assumes `https://`.
//!
//! The mapping is lossy. Any two non-alphanumeric characters collapse to the
//! same `_`, so `https://a.b/c` and `https://a/b/c` share a file, and the
//! reverse direction always yields `https://a/b/c`. The original scheme is
//! not recoverable either. Callers of `list_pages` must tolerate that the
//! recovered URL addresses the colliding record rather than the URL that was
//! crawled. Re-encoding a recovered URL always lands on the same file.

/// Extension of every page record
pub const PAGE_EXTENSION: &str = ".json";

/// Derives the record filename for a URL
///
/// # Examples
///
/// ```
/// use apidoc_harvester::url::url_to_filename;
///
/// assert_eq!(
///     url_to_filename("https://docs.example.com/users/{id}"),
///     "docs_example_com_users__id_.json"
/// );
/// ```
pub fn url_to_filename(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let mut filename: String = stripped
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    filename.push_str(PAGE_EXTENSION);
    filename
}

/// Recovers a URL from a record filename
///
/// Returns `None` if the name does not carry the page record extension.
pub fn filename_to_url(filename: &str) -> Option<String> {
    let stem = filename.strip_suffix(PAGE_EXTENSION)?;
    Some(format!("https://{}", stem.replace('_', "/")))
}
