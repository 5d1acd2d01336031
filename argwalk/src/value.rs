/*!
Typed values extracted from the command line, and the strict integer parser
behind [`Kind::Integer`].
*/

use crate::descriptor::Kind;

/// The decoded value of a matched argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value<'a> {
    /// Flags, subcommands, and anything else that doesn't take a value
    #[default]
    None,
    Str(&'a str),
    Int(i64),
}

impl<'a> Value<'a> {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
}

/// Convert value text into the representation for `kind`. Returns [`None`]
/// if the text isn't valid for that kind; only integers can fail.
pub(crate) fn coerce(kind: Kind, text: &str) -> Option<Value<'_>> {
    match kind {
        Kind::String => Some(Value::Str(text)),
        Kind::Integer => parse_int(text).map(Value::Int),
        Kind::Void | Kind::Subcommand => Some(Value::None),
    }
}

/**
Parse an integer, detecting the radix from its prefix: `0x` or `0X` for
hexadecimal, a leading `0` for octal, decimal otherwise. An optional sign
comes before the prefix. The whole string must be consumed.

```
use argwalk::value::parse_int;

assert_eq!(parse_int("0x1F"), Some(31));
assert_eq!(parse_int("-010"), Some(-8));
assert_eq!(parse_int("08"), None);
```
*/
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1
        && let Some(octal) = unsigned.strip_prefix('0')
    {
        (8, octal)
    } else {
        (10, unsigned)
    };

    // from_str_radix would accept another sign here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;

    match negative {
        false => i64::try_from(magnitude).ok(),
        true => 0i64.checked_sub_unsigned(magnitude),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-10"), Some(-10));
        assert_eq!(parse_int("+7"), Some(7));
    }

    #[test]
    fn hexadecimal() {
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0X1f"), Some(31));
        assert_eq!(parse_int("-0x1F"), Some(-31));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("0x1G"), None);
    }

    #[test]
    fn octal_is_strict() {
        assert_eq!(parse_int("010"), Some(8));
        assert_eq!(parse_int("00"), Some(0));
        assert_eq!(parse_int("08"), None);
        assert_eq!(parse_int("09"), None);
    }

    #[test]
    fn rejects_junk() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int(" 1"), None);
        assert_eq!(parse_int("1 "), None);
        assert_eq!(parse_int("12abc"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int("-+1"), None);
    }

    #[test]
    fn range() {
        assert_eq!(parse_int("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_int("9223372036854775808"), None);
        assert_eq!(parse_int("-9223372036854775809"), None);
        assert_eq!(parse_int("0xFFFFFFFFFFFFFFFFFF"), None);
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce(Kind::String, "08"), Some(Value::Str("08")));
        assert_eq!(coerce(Kind::Integer, "08"), None);
        assert_eq!(coerce(Kind::Integer, "010"), Some(Value::Int(8)));
    }
}
