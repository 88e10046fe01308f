//! Centralized number formatting utilities.
//!
//! All cell formatting of the analysis trees, the overview/ladder tables and
//! the live table goes through this module so every view renders numbers the
//! same way, and so European-style formatting (swapping `.` and `,`) can be
//! toggled in one place.

/// Sentinel shown by live percentage columns before any data arrived.
pub const NO_DATA_PERCENT: &str = "---.--%";

/// Apply European number format by swapping `.` and `,` in a formatted string.
fn europeanize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

/// Apply European formatting conditionally.
#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Insert `,` every three digits into a string of ASCII digits.
fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a float with a fixed number of decimals and thousands separators.
///
/// Non-finite values are rendered as-is (`NaN`, `inf`).
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_grouped;
/// assert_eq!(format_grouped(1234567.891, 2, false), "1,234,567.89");
/// assert_eq!(format_grouped(999.5, 0, false), "1,000");
/// assert_eq!(format_grouped(-1500.0, 1, false), "-1,500.0");
/// assert_eq!(format_grouped(1234.5, 2, true), "1.234,50");
/// ```
pub fn format_grouped(n: f64, decimals: usize, european: bool) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let raw = format!("{:.prec$}", n.abs(), prec = decimals);
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };
    let mut s = String::new();
    let is_zero = raw.bytes().all(|b| b == b'0' || b == b'.');
    if n < 0.0 && !is_zero {
        s.push('-');
    }
    s.push_str(&group_digits(int_part));
    if let Some(frac) = frac_part {
        s.push('.');
        s.push_str(frac);
    }
    maybe_eu(s, european)
}

/// Format a fraction (`0.25`) as a percentage with 2 decimals (`25.00%`).
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_ratio;
/// assert_eq!(format_ratio(0.2534, false), "25.34%");
/// assert_eq!(format_ratio(12.5, false), "1,250.00%");
/// ```
pub fn format_ratio(n: f64, european: bool) -> String {
    let mut s = format_grouped(n * 100.0, 2, european);
    s.push('%');
    s
}

/// Format an already scaled percentage (`25.34`) with 2 decimals (`25.34%`).
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_percent;
/// assert_eq!(format_percent(25.339, false), "25.34%");
/// assert_eq!(format_percent(25.339, true), "25,34%");
/// ```
pub fn format_percent(n: f64, european: bool) -> String {
    let mut s = format_grouped(n, 2, european);
    s.push('%');
    s
}

/// Format a magnitude with the given precision and thousands separators.
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_magnitude;
/// assert_eq!(format_magnitude(12345.678, 2, false), "12,345.68");
/// assert_eq!(format_magnitude(12345.678, 0, false), "12,346");
/// ```
pub fn format_magnitude(n: f64, decimals: usize, european: bool) -> String {
    format_grouped(n, decimals, european)
}

/// Format a count as an integer with thousands separators.
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_count;
/// assert_eq!(format_count(1500.0, false), "1,500");
/// assert_eq!(format_count(7.6, false), "8");
/// assert_eq!(format_count(1500.0, true), "1.500");
/// ```
pub fn format_count(n: f64, european: bool) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let value = n.round() as i64;
    let mut s = String::new();
    if value < 0 {
        s.push('-');
    }
    s.push_str(&group_digits(&value.unsigned_abs().to_string()));
    maybe_eu(s, european)
}

/// Format a duration in seconds with one decimal and an `s` suffix.
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_seconds;
/// assert_eq!(format_seconds(93.27, false), "93.3s");
/// assert_eq!(format_seconds(93.27, true), "93,3s");
/// ```
pub fn format_seconds(n: f64, european: bool) -> String {
    maybe_eu(format!("{:.1}s", n), european)
}

/// Format a live-table percentage; exactly zero means "no data yet".
///
/// # Examples
/// ```
/// use oscr_types::formatting::format_live_percent;
/// assert_eq!(format_live_percent(0.0, false), "---.--%");
/// assert_eq!(format_live_percent(12.5, false), "12.50%");
/// ```
pub fn format_live_percent(n: f64, european: bool) -> String {
    if n == 0.0 {
        return NO_DATA_PERCENT.to_string();
    }
    format_percent(n, european)
}
