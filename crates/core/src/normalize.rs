//! View-count normalization.
//!
//! Turns human-readable counts such as `"1.2M views"` or `"12,345"` into
//! integers that can be compared. The function is total: every stage that
//! cannot make sense of its input falls back to `0`.

const VIEWS_SUFFIX: &str = " views";

/// Magnitude markers, checked in this order. The first one present wins.
const MARKERS: [(char, f64); 3] = [('K', 1_000.0), ('M', 1_000_000.0), ('B', 1_000_000_000.0)];

/// Normalizes a raw view count. `None` stands for an absent cell.
pub fn normalize_views(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };

    let stripped = strip_views_suffix(raw);

    match marker_multiplier(stripped) {
        Some((marker, multiplier)) => parse_scaled(stripped, marker, multiplier),
        None => parse_plain(stripped),
    }
    .unwrap_or(0)
}

/// Drops the literal `" views"` and surrounding whitespace.
fn strip_views_suffix(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(VIEWS_SUFFIX)
        .unwrap_or(trimmed)
        .trim()
}

fn marker_multiplier(value: &str) -> Option<(char, f64)> {
    MARKERS
        .iter()
        .copied()
        .find(|(marker, _)| value.contains(*marker))
}

/// `"1.5K"` -> 1500. The product is truncated toward zero, not rounded.
fn parse_scaled(value: &str, marker: char, multiplier: f64) -> Option<i64> {
    let number: f64 = value.replace(marker, "").trim().parse().ok()?;
    let scaled = number * multiplier;
    if !scaled.is_finite() {
        return None;
    }
    // `as` saturates at the i64 bounds.
    Some(scaled.trunc() as i64)
}

/// `"12,345"` -> 12345.
fn parse_plain(value: &str) -> Option<i64> {
    value.replace(',', "").trim().parse().ok()
}
