use crate::errors::{EvalError, Result};
use crate::parser::Parser;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// One enabled configuration entry, as passed to rustc via `--cfg`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CfgSetting {
    Name(String),
    KeyValue(String, String),
}

impl FromStr for CfgSetting {
    type Err = EvalError;

    /// Accepts `name`, `key="value"` and `key=value`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EvalError::InvalidSetting(s.to_string());
        let mut p = Parser::new(s.trim());
        let name = p.parse_identifier().map_err(|_| invalid())?;
        p.skip_ws();
        if p.eof() {
            return Ok(CfgSetting::Name(name));
        }
        if !p.consume_char('=') {
            return Err(invalid());
        }
        p.skip_ws();
        let value = if p.peek_char() == Some('"') || p.peek_char() == Some('\'') {
            p.parse_quoted_string().map_err(|_| invalid())?
        } else {
            p.parse_identifier().map_err(|_| invalid())?
        };
        p.skip_ws();
        if !p.eof() {
            return Err(invalid());
        }
        Ok(CfgSetting::KeyValue(name, value))
    }
}

/// The enabled names and name/value pairs of a compilation unit.
///
/// Entries are not checked for consistency: a set analysing several targets
/// at once can legitimately enable both `unix` and `windows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgOptions {
    names: BTreeSet<String>,
    key_values: BTreeMap<String, BTreeSet<String>>,
}

impl CfgOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn insert_key_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.key_values
            .entry(key.into())
            .or_default()
            .insert(value.into());
    }

    pub fn insert(&mut self, setting: CfgSetting) {
        match setting {
            CfgSetting::Name(name) => self.insert_name(name),
            CfgSetting::KeyValue(key, value) => self.insert_key_value(key, value),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.insert_name(name);
        self
    }

    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_key_value(key, value);
        self
    }

    pub fn is_name_enabled(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_name_value_enabled(&self, name: &str, value: &str) -> bool {
        self.key_values
            .get(name)
            .is_some_and(|values| values.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.key_values.is_empty()
    }
}

impl FromIterator<CfgSetting> for CfgOptions {
    fn from_iter<I: IntoIterator<Item = CfgSetting>>(iter: I) -> Self {
        let mut options = CfgOptions::new();
        options.extend(iter);
        options
    }
}

impl Extend<CfgSetting> for CfgOptions {
    fn extend<I: IntoIterator<Item = CfgSetting>>(&mut self, iter: I) {
        for setting in iter {
            self.insert(setting);
        }
    }
}
