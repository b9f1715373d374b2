//! Positional format templates (`"{0} of {1:.1}"`).
//!
//! # Syntax
//!
//! - `{N}` inserts argument `N`.
//! - `{N:spec}` inserts argument `N` formatted with `spec`, where `spec` is
//!   `[<|>][0][width][.precision]`.
//! - `{{` and `}}` are literal braces.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Out-of-range index | `{3}` with two args | Token left as-is |
//! | Malformed token | `{name}`, `{0:x}` | Token left as-is |
//! | Unclosed brace | `"Hello {0"` | Emitted as-is |
//!
//! Parsing happens once in [`Template::parse`]; rendering is a single pass
//! with no recursive substitution.

use crate::number::NumberFormat;

/// Formatting options for one placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSpec {
    /// Minimum rendered width in chars.
    pub width: Option<usize>,
    /// Digits after the decimal separator for numeric arguments.
    pub precision: Option<usize>,
    /// Pad numbers with leading zeros instead of spaces.
    pub zero_pad: bool,
    /// Pad on the right instead of the left.
    pub left_align: bool,
}

impl FormatSpec {
    /// Parse the text after `:` in a placeholder.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let mut out = Self::default();
        let mut rest = spec;
        if let Some(r) = rest.strip_prefix('<') {
            out.left_align = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('>') {
            rest = r;
        }
        if let Some(r) = rest.strip_prefix('0') {
            out.zero_pad = true;
            rest = r;
        }
        let (width, precision) = match rest.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (rest, None),
        };
        if !width.is_empty() {
            out.width = Some(width.parse().ok()?);
        }
        if let Some(p) = precision {
            out.precision = Some(p.parse().ok()?);
        }
        Some(out)
    }

    /// Apply width and alignment to already-rendered text.
    #[must_use]
    pub fn pad(&self, text: String) -> String {
        let Some(width) = self.width else {
            return text;
        };
        let len = text.chars().count();
        if len >= width {
            return text;
        }
        let fill = width - len;
        if self.left_align {
            let mut out = text;
            out.extend(std::iter::repeat_n(' ', fill));
            out
        } else if self.zero_pad {
            let (sign, digits) = match text.strip_prefix('-') {
                Some(d) => ("-", d),
                None => ("", text.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{text}", " ".repeat(fill))
        }
    }

    /// Render an `f64` honoring precision and the locale decimal separator.
    #[must_use]
    pub fn format_f64(&self, value: f64, numbers: &NumberFormat) -> String {
        self.pad(numbers.format_fixed(value, self.precision))
    }

    /// Render an `f32` honoring precision and the locale decimal separator.
    #[must_use]
    pub fn format_f32(&self, value: f32, numbers: &NumberFormat) -> String {
        self.pad(numbers.format_fixed_f32(value, self.precision))
    }

    /// Render an integer; a precision turns it into a fixed-point number.
    #[must_use]
    pub fn format_i64(&self, value: i64, numbers: &NumberFormat) -> String {
        match self.precision {
            Some(_) => self.format_f64(value as f64, numbers),
            None => self.pad(value.to_string()),
        }
    }

    /// Render text; precision truncates to that many chars.
    #[must_use]
    pub fn format_str(&self, value: &str) -> String {
        let text = match self.precision {
            Some(p) => value.chars().take(p).collect(),
            None => value.to_string(),
        };
        let spec = Self {
            zero_pad: false,
            ..*self
        };
        spec.pad(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot {
        index: usize,
        spec: FormatSpec,
        raw: String,
    },
}

/// A parsed positional template.
///
/// # Example
///
/// ```
/// use tether_i18n::template::Template;
///
/// let template = Template::parse("{0} {1}");
/// let args = ["Ann", "Lee"];
/// let out = template.render(|i, spec| args.get(i).map(|a| spec.format_str(a)));
/// assert_eq!(out, "Ann Lee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template. Never fails; malformed tokens become literals.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut token = String::new();
                    let mut found_close = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            found_close = true;
                            break;
                        }
                        token.push(c);
                    }
                    if !found_close {
                        literal.push('{');
                        literal.push_str(&token);
                        continue;
                    }
                    match parse_slot(&token) {
                        Some((index, spec)) => {
                            if !literal.is_empty() {
                                segments.push(Segment::Literal(std::mem::take(&mut literal)));
                            }
                            segments.push(Segment::Slot {
                                index,
                                spec,
                                raw: format!("{{{token}}}"),
                            });
                        }
                        None => {
                            literal.push('{');
                            literal.push_str(&token);
                            literal.push('}');
                        }
                    }
                }
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    /// Number of argument slots the template references (highest index + 1).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot { index, .. } => Some(index + 1),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Render the template. `resolve` returns `None` for a missing argument,
    /// in which case the original token text is kept.
    pub fn render(&self, mut resolve: impl FnMut(usize, &FormatSpec) -> Option<String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot { index, spec, raw } => match resolve(*index, spec) {
                    Some(text) => out.push_str(&text),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

fn parse_slot(token: &str) -> Option<(usize, FormatSpec)> {
    let (index, spec) = match token.split_once(':') {
        Some((i, s)) => (i, FormatSpec::parse(s)?),
        None => (token, FormatSpec::default()),
    };
    let index = index.trim();
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((index.parse().ok()?, spec))
}
