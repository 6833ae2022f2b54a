use once_cell::sync::Lazy;
use regex::Regex;

/// Resolution token used by the storefront for its largest image rendition
const FULL_RESOLUTION_TOKEN: &str = "s-l1600.jpg";

static THUMBS_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|/)thumbs/").expect("valid thumbs pattern"));

/// A size token filling the whole last path segment
static SMALL_SIZE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|/)s-l\d+\.(?:jpe?g|png|webp)($|[?#])").expect("valid resolution pattern")
});

/// Rewrites a thumbnail asset reference to its full-resolution form
///
/// # Normalization Steps
///
/// 1. Strip every `thumbs/` path segment
/// 2. Rewrite a last path segment like `s-l300.jpg` to `s-l1600.jpg`
///
/// The function is total: input that matches neither pattern is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use shelf_harvest::url::normalize_asset_url;
///
/// assert_eq!(
///     normalize_asset_url("https://x/thumbs/s-l300.jpg"),
///     "https://x/s-l1600.jpg"
/// );
/// ```
pub fn normalize_asset_url(url: &str) -> String {
    let without_thumbs = THUMBS_SEGMENT.replace_all(url, "$1");
    SMALL_SIZE_TOKEN
        .replace_all(&without_thumbs, format!("${{1}}{}${{2}}", FULL_RESOLUTION_TOKEN))
        .into_owned()
}
