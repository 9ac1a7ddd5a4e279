//! Default environment of the command shell.

use std::fmt;

/// An ordered list of `name=value` variables the shell starts with.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DefaultEnvironment {
    vars: Vec<(String, String)>,
}

impl DefaultEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value but keeping its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.vars.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The environment image: every `name=value` terminated by a NUL, with
    /// one more NUL closing the list.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (name, value) in self.iter() {
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(b'=');
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(0);
        }
        bytes.push(0);

        bytes
    }
}

impl fmt::Display for DefaultEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}={value}")?;
        }

        Ok(())
    }
}

/// Format an address or size the way the board header spells it, e.g.
/// `0xA0000000`.
pub(crate) fn hex32(value: u32) -> String {
    format!("0x{value:08X}")
}
