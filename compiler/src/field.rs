use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{FieldSpec, LengthSpec};

lazy_static! {
    static ref FIELD_TOKEN: Regex = Regex::new(
        r"^\s*([A-Za-z_][A-Za-z0-9_]*)?\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[\s*(\.[A-Za-z_][A-Za-z0-9_]*|[A-Za-z_][A-Za-z0-9_]*|[0-9]+)?\s*\])?\s*$"
    )
    .unwrap();
}

/// Splits `attribute:format[length]` into its parts. The attribute and the
/// length are optional; anything else that does not fit the grammar (an
/// empty format, a negative or overflowing fixed count, stray characters)
/// yields `None`.
pub fn parse_field(token: &str) -> Option<FieldSpec> {
    let captures = FIELD_TOKEN.captures(token)?;
    let attribute = captures.get(1).map(|m| m.as_str().to_owned());
    let format = captures[2].to_owned();

    let has_brackets = token.contains('[');
    let length = match captures.get(3).map(|m| m.as_str()) {
        None if has_brackets => Some(LengthSpec::Declared),
        None => None,
        Some(text) if text.starts_with('.') => Some(LengthSpec::Sibling(text[1..].to_owned())),
        Some(text) if text.as_bytes()[0].is_ascii_digit() => Some(LengthSpec::Fixed(text.parse().ok()?)),
        Some(text) => Some(LengthSpec::Named(text.to_owned())),
    };

    Some(FieldSpec { attribute, format, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(attribute: Option<&str>, format: &str, length: Option<LengthSpec>) -> Option<FieldSpec> {
        Some(FieldSpec {
            attribute: attribute.map(str::to_owned),
            format: format.to_owned(),
            length,
        })
    }

    #[test]
    fn parse_scalars() {
        assert_eq!(parse_field("x:int32"), spec(Some("x"), "int32", None));
        assert_eq!(parse_field(" x : Point "), spec(Some("x"), "Point", None));
        assert_eq!(parse_field(":uint8"), spec(None, "uint8", None));
    }

    #[test]
    fn parse_lengths() {
        assert_eq!(parse_field("count:uint16[]"), spec(Some("count"), "uint16", Some(LengthSpec::Declared)));
        assert_eq!(parse_field("count:uint16[ ]"), spec(Some("count"), "uint16", Some(LengthSpec::Declared)));
        assert_eq!(
            parse_field("points:Point[count]"),
            spec(Some("points"), "Point", Some(LengthSpec::Named("count".into())))
        );
        assert_eq!(parse_field("pad:uint8[3]"), spec(Some("pad"), "uint8", Some(LengthSpec::Fixed(3))));
        assert_eq!(parse_field("ids:uint32[0]"), spec(Some("ids"), "uint32", Some(LengthSpec::Fixed(0))));
        assert_eq!(
            parse_field("ids:uint32[.n]"),
            spec(Some("ids"), "uint32", Some(LengthSpec::Sibling("n".into())))
        );
    }

    #[test]
    fn reject_malformed_tokens() {
        assert_eq!(parse_field("x"), None);
        assert_eq!(parse_field("x:"), None);
        assert_eq!(parse_field("x:int32[-1]"), None);
        assert_eq!(parse_field("x:int32[1"), None);
        assert_eq!(parse_field("x:int32[99999999999999999999999]"), None);
        assert_eq!(parse_field("x:int32[a b]"), None);
        assert_eq!(parse_field("x y:int32"), None);
        assert_eq!(parse_field("1x:int32"), None);
    }
}
