use std::fmt;

use serde::Serialize;

use super::Error;

/// Supported configuration value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    /// Booleans.
    Bool(bool),
    /// Integers, wide enough for any address or size.
    Integer(i128),
    /// Strings.
    String(String),
}

impl Value {
    /// Replace the value with `s`, parsed as the same variant.
    ///
    /// Integers accept decimal, `0x`, `0o` and `0b` notation with an
    /// optional leading `-`.
    pub(crate) fn parse_in_place(&mut self, s: &str) -> Result<(), Error> {
        *self = match self {
            Value::Bool(_) => match s {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => {
                    return Err(Error::parse(format!(
                        "Expected 'true' or 'false', found: '{s}'"
                    )))
                }
            },
            Value::Integer(_) => Value::Integer(parse_integer(s)?),
            Value::String(_) => Value::String(s.into()),
        };

        Ok(())
    }

    /// The boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
        }
    }
}

fn parse_integer(s: &str) -> Result<i128, Error> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    if digits.starts_with(['-', '+']) {
        return Err(Error::parse(format!("Expected valid integer value, found: '{s}'")));
    }

    let magnitude = match digits.as_bytes() {
        [b'0', b'x' | b'X', ..] => i128::from_str_radix(&digits[2..], 16),
        [b'0', b'o', ..] => i128::from_str_radix(&digits[2..], 8),
        [b'0', b'b', ..] => i128::from_str_radix(&digits[2..], 2),
        _ => digits.parse::<i128>(),
    }
    .map_err(|_| Error::parse(format!("Expected valid integer value, found: '{s}'")))?;

    Ok(if negative { -magnitude } else { magnitude })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}
