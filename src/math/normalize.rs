use once_cell::sync::Lazy;
use regex::Regex;

use crate::math::lexer::clean;

pub const POWER_MARKER: &str = "^";
pub const PRODUCT_MARKER: &str = "·";

static POWER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|\^").unwrap());

static DIGIT_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])([[:alpha:]])").unwrap());

/// Lower-cases, drops whitespace and `*`, writes both `^` and `**` as one
/// power marker and marks every digit-letter adjacency as a product, so `2x`
/// and `2*x` come out the same.
pub fn normalize(s: &str) -> String {
    let compact = clean(s);
    let powered = POWER_RE.replace_all(&compact, POWER_MARKER);
    let unstarred = powered.replace('*', "");
    DIGIT_LETTER_RE
        .replace_all(&unstarred, format!("${{1}}{PRODUCT_MARKER}${{2}}"))
        .into_owned()
}

pub fn answers_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
