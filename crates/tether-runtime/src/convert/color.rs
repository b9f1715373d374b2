use tether_style::Rgba;
use tracing::trace;

use crate::value::Value;

use super::ValueConverter;

/// HTML color text into `Value::Color`.
///
/// Unparseable text and non-text input become white. `Color` input passes
/// through. The backward direction emits `RRGGBBAA` hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodeToColorConverter;

impl HexCodeToColorConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ValueConverter for HexCodeToColorConverter {
    fn convert(&self, value: Value) -> Value {
        let color = match &value {
            Value::Color(c) => *c,
            Value::Str(text) => Rgba::parse_html(text).unwrap_or_else(|| {
                trace!(text = text.as_str(), "unrecognized color; using white");
                Rgba::WHITE
            }),
            _ => Rgba::WHITE,
        };
        Value::Color(color)
    }

    fn convert_back(&self, value: Value) -> Value {
        let color = match value {
            Value::Color(c) => c,
            _ => Rgba::WHITE,
        };
        Value::Str(color.to_hex_rgba())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        let conv = HexCodeToColorConverter::new();
        assert_eq!(conv.convert(Value::from("#FF0000")), Value::Color(Rgba::RED));
        assert_eq!(
            conv.convert(Value::from("teal")),
            Value::Color(Rgba::rgb(0, 128, 128))
        );
    }

    #[test]
    fn failures_become_white() {
        let conv = HexCodeToColorConverter::new();
        assert_eq!(conv.convert(Value::from("nope")), Value::Color(Rgba::WHITE));
        assert_eq!(conv.convert(Value::None), Value::Color(Rgba::WHITE));
        assert_eq!(conv.convert(Value::Int(3)), Value::Color(Rgba::WHITE));
        assert_eq!(conv.convert(Value::from("bad")), Value::Color(Rgba::WHITE));
        assert_eq!(conv.convert(Value::from("face")), Value::Color(Rgba::WHITE));
    }

    #[test]
    fn reads_back_its_own_output() {
        let conv = HexCodeToColorConverter::new();
        let color = Rgba::rgba(1, 2, 3, 4);
        let text = conv.convert_back(Value::Color(color));
        assert_eq!(conv.convert(text), Value::Color(color));
    }

    #[test]
    fn back_emits_rgba_hex() {
        let conv = HexCodeToColorConverter::new();
        assert_eq!(
            conv.convert_back(Value::Color(Rgba::rgba(1, 2, 3, 4))),
            Value::from("01020304")
        );
        assert_eq!(conv.convert_back(Value::from("x")), Value::from("FFFFFFFF"));
    }
}
