use crate::UrlError;
use url::Url;

/// Query keys that never change the document served
const TRACKING_KEYS: &[&str] = &["fbclid", "gclid", "msclkid", "mc_eid", "mc_cid", "_ga"];

/// Normalizes a URL so that equivalent links map to one visited-set key
///
/// Two spellings of the same documentation page normalize to the same URL:
///
/// - the scheme must be `http` or `https` and is kept as given
/// - the host is lowercased (the `url` parser does this for http schemes)
/// - `.`/`..` segments and repeated slashes are collapsed
/// - a trailing slash is dropped, except on the root path
/// - the fragment is dropped
/// - tracking keys (`utm_*`, click ids) are dropped and the remaining query
///   pairs are sorted by key; an empty query is removed entirely
///
/// # Examples
///
/// ```
/// use apidoc_harvester::url::normalize_url;
///
/// let url = normalize_url("https://DOCS.EXAMPLE.COM/reference/#users").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/reference");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(UrlError::InvalidScheme(format!(
                "expected http or https, got {}",
                other
            )))
        }
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlError::MissingDomain)?
        .to_ascii_lowercase();
    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host))
            .map_err(|e| UrlError::Malformed(format!("bad host {}: {}", host, e)))?;
    }

    let path = collapse_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);
    canonicalize_query(&mut url);

    Ok(url)
}

/// Collapses dot segments and empty segments; never returns an empty path
fn collapse_path(path: &str) -> String {
    let segments = path
        .split('/')
        .fold(Vec::<&str>::new(), |mut kept, segment| {
            match segment {
                "" | "." => {}
                ".." => {
                    kept.pop();
                }
                s => kept.push(s),
            }
            kept
        });

    format!("/{}", segments.join("/"))
}

fn canonicalize_query(url: &mut Url) {
    if url.query().is_none() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_key(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }

    // Stable: repeated keys keep their relative order
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

fn is_tracking_key(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_KEYS.contains(&key)
}
