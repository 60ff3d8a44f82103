// src/core/normalize.rs
//
// Display text → comparable integer.
// "12,900원" → 12900, "20%" → 20, "품절" → None.

/// Collect every ASCII digit in `text` and read them as one non-negative
/// integer. Separators, currency marks, percent signs and surrounding words
/// are skipped. No digits (or a value past `u64::MAX`) gives `None`; that is
/// the normal "unknown" outcome, never an error.
pub fn normalize(text: &str) -> Option<u64> {
    let mut value: u64 = 0;
    let mut seen = false;

    for b in text.bytes().filter(u8::is_ascii_digit) {
        seen = true;
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }

    seen.then_some(value)
}

/// [`normalize`] over an optional input; absent text is "no value".
pub fn normalize_opt(text: Option<&str>) -> Option<u64> {
    text.and_then(normalize)
}
