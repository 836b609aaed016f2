use regex::Regex;
use std::sync::LazyLock;

// `\d` is Unicode-aware: any decimal digit (general category Nd) in any script.
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern compiles"));
static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern compiles"));

/// Returns the smallest integer embedded in `text`, or `None` if it has no digits.
///
/// Every maximal run of decimal digits counts as one unsigned number, whatever
/// script the digits come from (`8`, `８`, `٨` all read as eight). Signs,
/// decimal points and separators are not recognised. Runs too large for `u64`
/// saturate at `u64::MAX`.
pub fn extract_min_rating(text: &str) -> Option<u64> {
    DIGIT_RUN.find_iter(text).map(|m| run_value(m.as_str())).min()
}

fn run_value(run: &str) -> u64 {
    run.chars()
        .try_fold(0u64, |acc, c| {
            acc.checked_mul(10)?.checked_add(u64::from(digit_value(c)))
        })
        .unwrap_or(u64::MAX)
}

fn is_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a single decimal digit.
///
/// Unicode encodes every Nd digit set as ten contiguous code points from zero
/// to nine, and sets that sit back to back are each still ten long, so the
/// offset from the start of the contiguous digit run, modulo ten, is the value.
fn digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let code = c as u32;
    let mut start = code;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_digit(prev) {
            break;
        }
        start -= 1;
    }
    (code - start) % 10
}
