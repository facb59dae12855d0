//! ASCII slugs for image cache keys and bundle file names.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"));

/// Letters NFKD leaves intact but which have a conventional ASCII spelling.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'þ' => "th",
        'Þ' => "TH",
        _ => return None,
    })
}

/// Lowercase, ASCII-only, hyphen-separated form of `input`.
///
/// Accents are stripped (`ä` becomes `a`) and every run of characters
/// outside `[a-z0-9]` collapses to a single hyphen. Leading and trailing
/// hyphens are removed, so the result may be empty.
pub fn slugify(input: &str) -> String {
    let mut ascii = String::with_capacity(input.len());
    for c in input.nfkd().filter(|c| !is_combining_mark(*c)) {
        match transliterate(c) {
            Some(s) => ascii.push_str(s),
            None if c.is_ascii() => ascii.push(c),
            None => ascii.push(' '),
        }
    }
    let lower = ascii.to_ascii_lowercase();
    NON_ALNUM
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
