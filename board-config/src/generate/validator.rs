use std::{io::Write, ops::Range};

use serde::Serialize;

use super::{snake_case, value::Value, Error};

/// Configuration value validation functions.
#[derive(Serialize)]
pub enum Validator {
    /// Only allow negative integers, i.e. any values less than 0.
    NegativeInteger,
    /// Only allow non-negative integers, i.e. any values greater than or
    /// equal to 0.
    NonNegativeInteger,
    /// Only allow positive integers, i.e. any values greater than to 0.
    PositiveInteger,
    /// Ensure that an integer value falls within the specified range.
    IntegerInRange(Range<i128>),
    /// Only allow one of the listed integers, e.g. a table of supported
    /// baud rates.
    IntegerOneOf(Vec<i128>),
    /// String-Enumeration. Only allows one of the given Strings.
    Enumeration(Vec<String>),
    /// A custom validation function to run against any supported value
    /// type.
    #[serde(serialize_with = "serialize_custom")]
    #[serde(untagged)]
    Custom(Box<dyn Fn(&Value) -> Result<(), Error>>),
}

pub(crate) fn serialize_custom<S>(
    _: &Box<dyn Fn(&Value) -> Result<(), Error>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("Custom")
}

impl Validator {
    pub(crate) fn validate(&self, value: &Value) -> Result<(), Error> {
        match self {
            Validator::NegativeInteger => negative_integer(value)?,
            Validator::NonNegativeInteger => non_negative_integer(value)?,
            Validator::PositiveInteger => positive_integer(value)?,
            Validator::IntegerInRange(range) => integer_in_range(range, value)?,
            Validator::IntegerOneOf(values) => integer_one_of(values, value)?,
            Validator::Enumeration(values) => enumeration(values, value)?,
            Validator::Custom(validator_fn) => validator_fn(value)?,
        }

        Ok(())
    }

    pub(crate) fn description(&self) -> Option<String> {
        match self {
            Validator::NegativeInteger => Some(String::from("Negative integer")),
            Validator::NonNegativeInteger => Some(String::from("Positive integer or 0")),
            Validator::PositiveInteger => Some(String::from("Positive integer")),
            Validator::IntegerInRange(range) => {
                Some(format!("Integer in range {}..{}", range.start, range.end))
            }
            Validator::IntegerOneOf(values) => Some(list_description(values)),
            Validator::Enumeration(values) => Some(list_description(values)),
            Validator::Custom(_) => None,
        }
    }

    pub(crate) fn emit_cargo_extras(
        &self,
        mut stdout: impl Write,
        config_key: &str,
        actual_value: &Value,
    ) {
        if let Validator::Enumeration(values) = self {
            for possible_value in values {
                writeln!(
                    stdout,
                    "cargo:rustc-check-cfg=cfg({config_key}_{})",
                    snake_case(possible_value)
                )
                .ok();
            }

            writeln!(
                stdout,
                "cargo:rustc-cfg={config_key}_{}",
                snake_case(&actual_value.to_string())
            )
            .ok();
        }
    }
}

fn list_description<T: std::fmt::Display>(values: &[T]) -> String {
    format!(
        "One of: <ul>{}</ul>",
        values
            .iter()
            .map(|v| format!("<li>{v}</li>"))
            .collect::<String>()
    )
}

pub(crate) fn enumeration(values: &[String], value: &Value) -> Result<(), Error> {
    let Some(value) = value.as_str() else {
        return Err(Error::parse(format!(
            "Validator::Enumeration expects a string, found {} '{value}'",
            value.kind()
        )));
    };

    if !values.iter().any(|v| v == value) {
        return Err(Error::validation(format!(
            "Expected one of {values:?}, found '{value}'"
        )));
    }

    Ok(())
}

fn integer(validator: &str, value: &Value) -> Result<i128, Error> {
    value.as_integer().ok_or_else(|| {
        Error::validation(format!(
            "Validator::{validator} expects an integer, found {} '{value}'",
            value.kind()
        ))
    })
}

pub(crate) fn integer_one_of(values: &[i128], value: &Value) -> Result<(), Error> {
    let value = integer("IntegerOneOf", value)?;
    if !values.contains(&value) {
        return Err(Error::validation(format!(
            "Expected one of {values:?}, found '{value}'"
        )));
    }

    Ok(())
}

fn integer_sign(
    validator: &str,
    value: &Value,
    accept: impl Fn(i128) -> bool,
    expected: &str,
) -> Result<(), Error> {
    let value = integer(validator, value)?;
    if !accept(value) {
        return Err(Error::validation(format!(
            "Expected {expected} integer, found '{value}'"
        )));
    }

    Ok(())
}

pub(crate) fn negative_integer(value: &Value) -> Result<(), Error> {
    integer_sign("NegativeInteger", value, |v| v < 0, "negative")
}

pub(crate) fn non_negative_integer(value: &Value) -> Result<(), Error> {
    integer_sign("NonNegativeInteger", value, |v| v >= 0, "non-negative")
}

pub(crate) fn positive_integer(value: &Value) -> Result<(), Error> {
    integer_sign("PositiveInteger", value, |v| v > 0, "positive")
}

pub(crate) fn integer_in_range(range: &Range<i128>, value: &Value) -> Result<(), Error> {
    let value = integer("IntegerInRange", value)?;
    if !range.contains(&value) {
        return Err(Error::validation(format!(
            "Value '{value}' does not fall within range '{range:?}'"
        )));
    }

    Ok(())
}
