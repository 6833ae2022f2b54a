//! File name derivation for downloaded assets

use crate::state::Record;
use once_cell::sync::Lazy;
use regex::Regex;

static PATH_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\]").expect("valid separator pattern"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._\s]").expect("valid character class"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid whitespace pattern"));

/// Extensions accepted as-is; anything else gets `.jpg` appended
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const DEFAULT_EXTENSION: &str = "jpg";

/// Maps a label to a name containing only ASCII letters, digits, `.` and `_`
///
/// Path separators and whitespace become `_`; every other character outside
/// that set is dropped. The mapping is pure, so two labels may collide.
///
/// # Examples
///
/// ```
/// use shelf_harvest::download::sanitize_label;
///
/// assert_eq!(sanitize_label("My/Item Name.png"), "My_Item_Name.png");
/// assert_eq!(sanitize_label("50% off!"), "50_off");
/// ```
pub fn sanitize_label(label: &str) -> String {
    let separated = PATH_SEPARATORS.replace_all(label, "_");
    let allowed = DISALLOWED.replace_all(&separated, "");
    WHITESPACE.replace_all(&allowed, "_").into_owned()
}

/// Returns true if `name` already ends in an accepted image extension
fn has_accepted_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted)),
        _ => false,
    }
}

/// Derives the on-disk file name for a record's asset
///
/// The label is sanitized; records without a usable label fall back to their
/// id, then to `untitled`. With `disambiguate` set, the record id is inserted
/// before the extension so that equal labels map to distinct files.
pub fn file_name_for(record: &Record, disambiguate: bool) -> String {
    let id = record.id().map(sanitize_label).filter(|id| !id.is_empty());

    let label = record
        .label()
        .map(sanitize_label)
        .filter(|name| !name.trim_matches('.').is_empty());
    let from_label = label.is_some();

    let base = label
        .or_else(|| id.clone())
        .unwrap_or_else(|| "untitled".to_string());

    let named = if has_accepted_extension(&base) {
        base
    } else {
        format!("{}.{}", base, DEFAULT_EXTENSION)
    };

    // A name derived from the id is already unique
    match (disambiguate && from_label, id) {
        (true, Some(id)) => match named.rsplit_once('.') {
            Some((stem, ext)) => format!("{}_{}.{}", stem, id, ext),
            None => format!("{}_{}", named, id),
        },
        _ => named,
    }
}
