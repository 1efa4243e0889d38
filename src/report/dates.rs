use chrono::{Days, NaiveDate, Utc};

/// Resolve a date expression against `today`.
///
/// - `"<N>daysAgo"` (case and whitespace insensitive, so `"7 days ago"` works too)
///   resolves to `today - N` days.
/// - `"today"` resolves to `today`.
/// - Anything else is returned verbatim and assumed to already be a
///   `YYYY-MM-DD` date. Malformed input is not rejected here; the upstream
///   service reports it.
pub fn resolve_date(expr: &str, today: NaiveDate) -> String {
    let compact: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    if compact == "today" {
        return today.to_string();
    }

    if let Some(count) = compact.strip_suffix("daysago") {
        if let Some(date) = count
            .parse::<u64>()
            .ok()
            .and_then(|n| today.checked_sub_days(Days::new(n)))
        {
            return date.to_string();
        }
    }

    expr.to_string()
}

/// Resolve a date expression against the current UTC date.
pub fn resolve_date_now(expr: &str) -> String {
    resolve_date(expr, Utc::now().date_naive())
}
