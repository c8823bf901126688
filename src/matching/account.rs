//! Account identity extraction from screenshot filenames.
//!
//! The screenshot-capture side names files after the window title (an email
//! address) with `@` replaced by `_at_`, followed by a capture timestamp:
//!
//! ```text
//! <localpart>_at_<domain>_<YYYYMMDD>_<HHMMSS>.<ext>
//! ```
//!
//! The account id is everything before the two timestamp segments, with
//! `_at_` substituted back to `@`.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static FILENAME_RE: OnceLock<Regex> = OnceLock::new();

fn filename_re() -> &'static Regex {
    FILENAME_RE.get_or_init(|| {
        Regex::new(r"^(?P<ident>.+_at_.+)_(?P<date>\d{8})_(?P<time>\d{6})$")
            .expect("filename pattern is a valid regex")
    })
}

/// Extracts the account id from a screenshot filename.
///
/// Returns `None` for filenames that do not follow the capture naming
/// convention. Underscores in the local part are preserved:
/// `john_doe_at_example.com_20240101_120000.png` yields
/// `john_doe@example.com`.
pub fn account_from_filename(filename: &str) -> Option<String> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let caps = filename_re().captures(stem)?;
    Some(caps["ident"].replace("_at_", "@"))
}
