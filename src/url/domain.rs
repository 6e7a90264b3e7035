use url::{Host, Url};

/// Second-level labels that act as public suffixes under a country code
/// (`co.uk`, `com.au`, ...). Without them `api.example.co.uk` and
/// `shop.other.co.uk` would share the registrable domain `co.uk`.
const SECOND_LEVEL_SUFFIXES: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org", "ne", "or"];

/// Returns the registrable domain of a URL, which defines the site scope
///
/// `docs.example.com` and `api.example.com` both reduce to `example.com`.
/// IP addresses and single-label hosts such as `localhost` are their own
/// registrable domain. Ports are ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use apidoc_harvester::url::registrable_domain;
///
/// let url = Url::parse("https://docs.example.com/reference").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://api.example.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();

            let keep = match labels.as_slice() {
                [] => return None,
                [.., second, top]
                    if labels.len() >= 3
                        && top.len() == 2
                        && SECOND_LEVEL_SUFFIXES.contains(second) =>
                {
                    3
                }
                _ => 2,
            };

            let start = labels.len().saturating_sub(keep);
            Some(labels[start..].join("."))
        }
    }
}
