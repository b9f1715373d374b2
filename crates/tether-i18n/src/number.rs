//! Locale-aware number parsing and fixed-point formatting.
//!
//! # Invariants
//!
//! 1. Parsing never panics; anything that is not a number yields `None`.
//! 2. Integers accept an optional sign and ASCII digits only (no group
//!    separators, no decimal part), surrounded by optional whitespace.
//! 3. Floating-point input may contain group separators before the decimal
//!    separator, a locale decimal separator, and an exponent.
//! 4. `parse_f64(&format_fixed(x, p))` recovers `x` rounded to `p` digits.

/// Decimal and group separators for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Decimal separator (`.` in English, `,` in German).
    pub decimal: char,
    /// Digit-group separator (`,` in English, `.` in German).
    pub group: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::INVARIANT
    }
}

impl NumberFormat {
    /// Culture-invariant separators.
    pub const INVARIANT: Self = Self {
        decimal: '.',
        group: ',',
    };

    /// Select separators for a locale tag (e.g., `"en-US"`, `"de"`, `"fr_CA"`).
    ///
    /// Falls back to [`NumberFormat::INVARIANT`] for unknown languages.
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        let primary = locale.split(['-', '_']).next().unwrap_or(locale);

        match primary.to_ascii_lowercase().as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" | "el" | "ro" | "hr" | "sl"
            | "sr" => Self {
                decimal: ',',
                group: '.',
            },
            "fr" | "ru" | "uk" | "pl" | "cs" | "sk" | "sv" | "nb" | "no" | "fi" | "hu" | "bg"
            | "et" | "lt" | "lv" => Self {
                decimal: ',',
                group: '\u{a0}',
            },
            _ => Self::INVARIANT,
        }
    }

    /// Parse a signed integer.
    #[must_use]
    pub fn parse_i64(&self, text: &str) -> Option<i64> {
        let text = text.trim();
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }

    /// Parse a double-precision float.
    #[must_use]
    pub fn parse_f64(&self, text: &str) -> Option<f64> {
        self.normalize(text)?.parse().ok()
    }

    /// Parse a single-precision float.
    #[must_use]
    pub fn parse_f32(&self, text: &str) -> Option<f32> {
        self.normalize(text)?.parse().ok()
    }

    /// Format with a fixed number of fractional digits, or the shortest
    /// round-trip representation when `precision` is `None`.
    #[must_use]
    pub fn format_fixed(&self, value: f64, precision: Option<usize>) -> String {
        let raw = match precision {
            Some(p) => format!("{value:.p$}"),
            None => format!("{value}"),
        };
        self.localize(raw)
    }

    /// Same as [`format_fixed`](Self::format_fixed) for `f32`, which keeps
    /// the shortest representation of the narrower type.
    #[must_use]
    pub fn format_fixed_f32(&self, value: f32, precision: Option<usize>) -> String {
        let raw = match precision {
            Some(p) => format!("{value:.p$}"),
            None => format!("{value}"),
        };
        self.localize(raw)
    }

    fn localize(&self, raw: String) -> String {
        if self.decimal == '.' {
            raw
        } else {
            raw.replace('.', &self.decimal.to_string())
        }
    }

    /// Rewrite locale input into Rust float syntax.
    fn normalize(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(text.len());
        let mut seen_decimal = false;
        for c in text.chars() {
            if c == self.decimal {
                if seen_decimal {
                    return None;
                }
                seen_decimal = true;
                out.push('.');
            } else if !seen_decimal && self.is_group(c) {
                continue;
            } else if c == '.' {
                // A '.' that is neither the decimal nor the group separator.
                return None;
            } else {
                out.push(c);
            }
        }
        Some(out)
    }

    fn is_group(&self, c: char) -> bool {
        c == self.group || (self.group == '\u{a0}' && matches!(c, ' ' | '\u{202f}'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn locale_selection() {
        assert_eq!(NumberFormat::for_locale("en-US"), NumberFormat::INVARIANT);
        assert_eq!(NumberFormat::for_locale("de_DE").decimal, ',');
        assert_eq!(NumberFormat::for_locale("fr").group, '\u{a0}');
        assert_eq!(NumberFormat::for_locale("xx"), NumberFormat::INVARIANT);
    }

    #[test]
    fn integers_reject_separators() {
        let nf = NumberFormat::INVARIANT;
        assert_eq!(nf.parse_i64(" 42 "), Some(42));
        assert_eq!(nf.parse_i64("-7"), Some(-7));
        assert_eq!(nf.parse_i64("+7"), Some(7));
        assert_eq!(nf.parse_i64("1,000"), None);
        assert_eq!(nf.parse_i64("3.5"), None);
        assert_eq!(nf.parse_i64(""), None);
        assert_eq!(nf.parse_i64("-"), None);
    }

    #[test]
    fn floats_follow_locale_separators() {
        let en = NumberFormat::for_locale("en");
        let de = NumberFormat::for_locale("de");
        let fr = NumberFormat::for_locale("fr");
        assert_eq!(en.parse_f64("1,234.5"), Some(1234.5));
        assert_eq!(de.parse_f64("1.234,5"), Some(1234.5));
        assert_eq!(de.parse_f64("1,5"), Some(1.5));
        assert_eq!(fr.parse_f64("1 234,5"), Some(1234.5));
        assert_eq!(en.parse_f64("2.5e3"), Some(2500.0));
        assert_eq!(fr.parse_f64("1.5"), None);
    }

    #[test]
    fn floats_reject_garbage() {
        let en = NumberFormat::INVARIANT;
        assert_eq!(en.parse_f64(""), None);
        assert_eq!(en.parse_f64("abc"), None);
        assert_eq!(en.parse_f64("1.2.3"), None);
        assert_eq!(en.parse_f32("   "), None);
    }

    #[test]
    fn fixed_formatting_localizes_decimal() {
        let de = NumberFormat::for_locale("de");
        assert_eq!(de.format_fixed(1.5, Some(2)), "1,50");
        assert_eq!(NumberFormat::INVARIANT.format_fixed(0.25, None), "0.25");
        assert_eq!(de.format_fixed_f32(0.5, None), "0,5");
    }

    proptest! {
        #[test]
        fn fixed_round_trip(value in -1.0e6f64..1.0e6, locale in prop::sample::select(vec!["en", "de", "fr"])) {
            let nf = NumberFormat::for_locale(locale);
            let text = nf.format_fixed(value, None);
            prop_assert_eq!(nf.parse_f64(&text), Some(value));
        }

        #[test]
        fn integer_round_trip(value in any::<i64>()) {
            prop_assert_eq!(NumberFormat::INVARIANT.parse_i64(&value.to_string()), Some(value));
        }
    }
}
