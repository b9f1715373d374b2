//! Date/time and time-span text conversion.
//!
//! Date-time patterns use `strftime` syntax. An empty or missing pattern
//! selects the locale default from [`tether_i18n::calendar`]; an invalid
//! pattern falls back to the invariant pattern.
//!
//! Time-span patterns:
//!
//! | Pattern | Output |
//! |---------|--------|
//! | `c` (default) | `[-][d.]hh:mm:ss[.fffffff]` |
//! | `g` | `[-][d:]h:mm:ss[.FFFFFFF]`, locale decimal separator |
//! | `G` | `[-]d:hh:mm:ss.fffffff`, locale decimal separator |
//! | custom | `d`, `h`, `m`, `s` runs (zero-padded to run length), `f`/`F` runs for fractions, `\x` and `'…'` literals |
//!
//! Custom patterns format the magnitude only; put a literal `-` in the
//! pattern if a sign is wanted.

use std::fmt::Write as _;

use chrono::{NaiveDateTime, TimeDelta};
use tether_i18n::calendar::{INVARIANT_DATE_TIME, date_time_pattern};
use tether_i18n::{Locale, NumberFormat};
use tracing::warn;

use crate::locale::current_locale;
use crate::value::Value;

use super::ValueConverter;

/// Format a date-time with `format` (or the locale default).
#[must_use]
pub fn format_date_time(value: &NaiveDateTime, format: Option<&str>, locale: &str) -> String {
    let pattern = format
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| date_time_pattern(locale));
    let mut out = String::new();
    if write!(out, "{}", value.format(pattern)).is_err() {
        warn!(pattern, "invalid date-time pattern; using invariant pattern");
        out.clear();
        out.push_str(&value.format(INVARIANT_DATE_TIME).to_string());
    }
    out
}

struct SpanParts {
    negative: bool,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    ticks: u32,
}

impl SpanParts {
    fn of(delta: &TimeDelta) -> Self {
        let magnitude = delta.abs();
        let total = magnitude.num_seconds();
        Self {
            negative: *delta < TimeDelta::zero(),
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
            ticks: magnitude.subsec_nanos().unsigned_abs() / 100,
        }
    }
}

/// Format a time span with `format` (or the constant `c` pattern).
#[must_use]
pub fn format_time_span(value: &TimeDelta, format: Option<&str>, locale: &str) -> String {
    let parts = SpanParts::of(value);
    let sign = if parts.negative { "-" } else { "" };
    let decimal = NumberFormat::for_locale(locale).decimal;
    match format.filter(|f| !f.is_empty()).unwrap_or("c") {
        "c" | "t" | "T" => {
            let mut out = String::from(sign);
            if parts.days != 0 {
                out.push_str(&format!("{}.", parts.days));
            }
            out.push_str(&format!("{:02}:{:02}:{:02}", parts.hours, parts.minutes, parts.seconds));
            if parts.ticks != 0 {
                out.push_str(&format!(".{:07}", parts.ticks));
            }
            out
        }
        "g" => {
            let mut out = String::from(sign);
            if parts.days != 0 {
                out.push_str(&format!("{}:", parts.days));
            }
            out.push_str(&format!("{}:{:02}:{:02}", parts.hours, parts.minutes, parts.seconds));
            if parts.ticks != 0 {
                let fraction = format!("{:07}", parts.ticks);
                out.push(decimal);
                out.push_str(fraction.trim_end_matches('0'));
            }
            out
        }
        "G" => format!(
            "{sign}{}:{:02}:{:02}:{:02}{decimal}{:07}",
            parts.days, parts.hours, parts.minutes, parts.seconds, parts.ticks
        ),
        custom => format_custom(&parts, custom),
    }
}

fn format_custom(parts: &SpanParts, pattern: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match c {
            'd' => {
                out.push_str(&format!("{:0width$}", parts.days, width = run));
                i += run;
            }
            'h' => {
                out.push_str(&format!("{:0width$}", parts.hours, width = run.min(2)));
                i += run;
            }
            'm' => {
                out.push_str(&format!("{:0width$}", parts.minutes, width = run.min(2)));
                i += run;
            }
            's' => {
                out.push_str(&format!("{:0width$}", parts.seconds, width = run.min(2)));
                i += run;
            }
            'f' | 'F' => {
                let digits = run.min(7);
                let fraction = format!("{:07}", parts.ticks);
                let head = &fraction[..digits];
                if c == 'f' {
                    out.push_str(head);
                } else {
                    out.push_str(head.trim_end_matches('0'));
                }
                i += run;
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    out.push(*next);
                }
                i += 2;
            }
            '\'' | '"' => {
                let close = chars[i + 1..].iter().position(|&x| x == c);
                match close {
                    Some(len) => {
                        out.extend(&chars[i + 1..i + 1 + len]);
                        i += len + 2;
                    }
                    None => {
                        out.extend(&chars[i + 1..]);
                        i = chars.len();
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

/// `DateTime` into text; other input passes through unchanged.
#[derive(Debug, Clone, Default)]
pub struct DateTimeToStringConverter {
    format: Option<String>,
    locale: Option<Locale>,
}

impl DateTimeToStringConverter {
    #[must_use]
    pub fn new(format: Option<&str>) -> Self {
        Self {
            format: format.map(str::to_string),
            locale: None,
        }
    }

    #[must_use]
    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ValueConverter for DateTimeToStringConverter {
    fn convert(&self, value: Value) -> Value {
        match value {
            Value::DateTime(dt) => {
                let locale = self.locale.clone().unwrap_or_else(current_locale);
                Value::Str(format_date_time(&dt, self.format.as_deref(), &locale))
            }
            other => other,
        }
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

/// `Duration` into text; other input passes through unchanged.
#[derive(Debug, Clone, Default)]
pub struct TimeSpanToStringConverter {
    format: Option<String>,
    locale: Option<Locale>,
}

impl TimeSpanToStringConverter {
    #[must_use]
    pub fn new(format: Option<&str>) -> Self {
        Self {
            format: format.map(str::to_string),
            locale: None,
        }
    }

    #[must_use]
    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ValueConverter for TimeSpanToStringConverter {
    fn convert(&self, value: Value) -> Value {
        match value {
            Value::Duration(delta) => {
                let locale = self.locale.clone().unwrap_or_else(current_locale);
                Value::Str(format_time_span(&delta, self.format.as_deref(), &locale))
            }
            other => other,
        }
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}
