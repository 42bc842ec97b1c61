//! Shared mapping helpers for source adapters.

use regex::Regex;
use std::sync::OnceLock;

/// Format provider min/max salary figures into one display string.
///
/// Returns `None` when neither bound is present — callers must not bake a
/// default into the posting; display-time rendering handles absence.
pub(crate) fn format_salary_range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    let fmt = |v: f64| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = v.round() as u64;
        format_thousands(whole)
    };
    match (min, max) {
        (Some(lo), Some(hi)) => Some(format!("${} - ${}", fmt(lo), fmt(hi))),
        (Some(lo), None) => Some(format!("${}+", fmt(lo))),
        (None, Some(hi)) => Some(format!("Up to ${}", fmt(hi))),
        (None, None) => None,
    }
}

fn format_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Best-effort numeric floor extracted from a display salary string.
///
/// Takes the first number in the string ("$70,000 - $90,000" → 70000),
/// honouring a `k` suffix ("$70k" → 70000). Returns `None` when no number
/// is present (e.g. "Negotiable", "Competitive").
pub(crate) fn extract_salary_floor(display: &str) -> Option<u64> {
    static SALARY_RE: OnceLock<Regex> = OnceLock::new();
    let re = SALARY_RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k?)").expect("valid salary regex")
    });

    let caps = re.captures(display)?;
    let raw = caps.get(1)?.as_str().replace(',', "");
    let value: f64 = raw.parse().ok()?;
    let multiplier = if caps.get(2).is_some_and(|m| !m.as_str().is_empty()) {
        1000.0
    } else {
        1.0
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some((value * multiplier) as u64)
}

/// Case-insensitive check that every whitespace-separated query term occurs
/// in `haystack`. Used by adapters whose provider cannot search server-side.
pub(crate) fn matches_query(haystack: &str, query: &str) -> bool {
    let lowered = haystack.to_lowercase();
    query
        .split_whitespace()
        .all(|term| lowered.contains(&term.to_lowercase()))
}

/// Strip HTML tags from a string, returning plain text.
pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}
