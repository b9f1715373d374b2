//! Default date/time display patterns per locale.
//!
//! Patterns use `strftime` syntax (as understood by `chrono`). Only the
//! primary language subtag selects a pattern, except for English where the
//! region decides between month-first (`en-US`, default) and day-first
//! (`en-GB`, `en-AU`, `en-IE`, `en-NZ`, `en-IN`) ordering.

/// Fallback when a locale has no dedicated pattern.
pub const INVARIANT_DATE_TIME: &str = "%m/%d/%Y %H:%M:%S";

/// Full date-and-time pattern for a locale tag.
#[must_use]
pub fn date_time_pattern(locale: &str) -> &'static str {
    let mut parts = locale.split(['-', '_']);
    let primary = parts.next().unwrap_or(locale).to_ascii_lowercase();
    let region = parts.next().map(str::to_ascii_uppercase);

    match primary.as_str() {
        "en" => match region.as_deref() {
            Some("GB" | "AU" | "IE" | "NZ" | "IN") => "%d/%m/%Y %H:%M:%S",
            _ => "%-m/%-d/%Y %-I:%M:%S %p",
        },
        "de" | "ru" | "uk" | "pl" | "cs" | "fi" | "nb" | "no" | "tr" => "%d.%m.%Y %H:%M:%S",
        "fr" | "es" | "it" | "pt" | "el" => "%d/%m/%Y %H:%M:%S",
        "nl" => "%d-%m-%Y %H:%M:%S",
        "sv" => "%Y-%m-%d %H:%M:%S",
        "ja" | "zh" => "%Y/%m/%d %H:%M:%S",
        "ko" => "%Y. %m. %d. %H:%M:%S",
        _ => INVARIANT_DATE_TIME,
    }
}
