use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
use url::Url;

/// Derives a stable record identifier from a detail-page URL
///
/// The identifier is the slug of the last non-empty path segment, after
/// percent-decoding. When the URL has no usable segment, a hash-based
/// identifier is used instead.
///
/// # Examples
///
/// ```
/// use action_scraper::url::derive_identifier;
///
/// assert_eq!(
///     derive_identifier("https://example.com/actions/2025/01/Securing-Our-Borders/"),
///     "securing-our-borders"
/// );
/// ```
pub fn derive_identifier(url: &str) -> String {
    let segment = Url::parse(url).ok().and_then(|parsed| {
        parsed.path_segments().and_then(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .last()
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        })
    });

    let slug = segment.map(|s| slugify(&s)).unwrap_or_default();
    if slug.is_empty() {
        format!("action-{}", &url_digest(url)[..12])
    } else {
        slug
    }
}

/// Appends a short URL digest to an identifier that is already taken
pub fn disambiguate(identifier: &str, url: &str) -> String {
    format!("{}-{}", identifier, &url_digest(url)[..8])
}

/// Turns arbitrary text into a lowercase `[a-z0-9-]` slug
///
/// Non-alphanumeric characters become hyphens, runs of hyphens collapse, and
/// leading/trailing hyphens are trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}
