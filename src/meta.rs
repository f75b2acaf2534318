// src/meta.rs
use crate::errors::Result;
use crate::parser::Parser;
use crate::predicate::CfgItem;
use itertools::Itertools;
use std::fmt;

/// Literal on the right of `name = ..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaLit {
    /// String or raw string; the only literal a cfg leaf accepts.
    Str(String),
    /// Any other literal token, kept as written (`1`, `true`, `b"x"`).
    Other(String),
}

/// Generic attribute argument: `path`, `path = lit` or `path(args..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaItem {
    pub path: String,
    pub args: Option<Vec<MetaItem>>,
    pub value: Option<MetaLit>,
}

impl MetaItem {
    pub fn word(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: None,
            value: None,
        }
    }

    pub fn name_value(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_lit(path, MetaLit::Str(value.into()))
    }

    pub fn with_lit(path: impl Into<String>, lit: MetaLit) -> Self {
        Self {
            path: path.into(),
            args: None,
            value: Some(lit),
        }
    }

    pub fn list(path: impl Into<String>, args: Vec<MetaItem>) -> Self {
        Self {
            path: path.into(),
            args: Some(args),
            value: None,
        }
    }

    fn is_single_segment(&self) -> bool {
        !self.path.contains("::")
    }
}

// cfg only knows single-segment names and string values; anything else is
// exposed without a name so it builds an error predicate.
impl CfgItem for MetaItem {
    fn combinator(&self) -> Option<&str> {
        match self.args {
            Some(_) if self.is_single_segment() => Some(self.path.as_str()),
            _ => None,
        }
    }

    fn args(&self) -> Option<&[Self]> {
        self.args.as_deref()
    }

    fn name(&self) -> Option<&str> {
        match (&self.args, &self.value) {
            (None, None | Some(MetaLit::Str(_))) if self.is_single_segment() => {
                Some(self.path.as_str())
            }
            _ => None,
        }
    }

    fn value(&self) -> Option<&str> {
        match &self.value {
            Some(MetaLit::Str(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for MetaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.args, &self.value) {
            (Some(args), _) => write!(f, "{}({})", self.path, args.iter().join(", ")),
            (None, Some(MetaLit::Str(value))) => write!(f, "{} = {:?}", self.path, value),
            (None, Some(MetaLit::Other(raw))) => write!(f, "{} = {}", self.path, raw),
            (None, None) => f.write_str(&self.path),
        }
    }
}

/// Parses a single meta item such as `all(unix, feature = "foo")`.
pub fn parse_meta(input: &str) -> Result<MetaItem> {
    let mut p = MetaParser::new(input);
    let node = p.parse_node()?;
    p.parser.skip_ws();
    if !p.parser.eof() {
        return Err(p.parser.error("trailing input"));
    }
    Ok(node)
}

/// Parses an attribute list. Each attribute may be wrapped in `#[...]` or
/// `#![...]`; commas between attributes are optional.
pub fn parse_attrs(input: &str) -> Result<Vec<MetaItem>> {
    let mut p = MetaParser::new(input);
    let mut out = Vec::new();
    loop {
        p.parser.skip_ws();
        if p.parser.eof() {
            break;
        }
        if p.parser.consume_char('#') {
            p.parser.skip_ws();
            p.parser.consume_char('!');
            p.parser.skip_ws();
            p.parser.expect('[')?;
            out.push(p.parse_node()?);
            p.parser.skip_ws();
            p.parser.expect(']')?;
        } else {
            out.push(p.parse_node()?);
        }
        p.parser.skip_ws();
        p.parser.consume_char(',');
    }
    Ok(out)
}

struct MetaParser<'a> {
    parser: Parser<'a>,
}

impl<'a> MetaParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            parser: Parser::new(s),
        }
    }

    fn parse_node(&mut self) -> Result<MetaItem> {
        self.parser.skip_ws();
        let path = self.parser.parse_path()?;
        self.parser.skip_ws();
        if self.parser.consume_char('(') {
            let args = self.parse_args()?;
            self.parser.expect(')')?;
            return Ok(MetaItem::list(path, args));
        }
        if self.parser.consume_char('=') {
            self.parser.skip_ws();
            let lit = self.parse_lit()?;
            return Ok(MetaItem::with_lit(path, lit));
        }
        Ok(MetaItem::word(path))
    }

    fn parse_lit(&mut self) -> Result<MetaLit> {
        let p = &mut self.parser;
        if p.peek_str("r\"") || p.peek_str("r#") {
            return Ok(MetaLit::Str(p.parse_raw_string()?));
        }
        if p.peek_str("b\"") || p.peek_str("b'") {
            p.consume_char('b');
            return Ok(MetaLit::Other(format!("b{:?}", p.parse_quoted_string()?)));
        }
        if p.peek_str("br\"") || p.peek_str("br#") {
            p.consume_char('b');
            return Ok(MetaLit::Other(format!("b{:?}", p.parse_raw_string()?)));
        }
        match p.peek_char() {
            Some('"' | '\'') => Ok(MetaLit::Str(p.parse_quoted_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(MetaLit::Other(p.parse_number()?)),
            _ => match p.parse_identifier()?.as_str() {
                b @ ("true" | "false") => Ok(MetaLit::Other(b.to_string())),
                _ => Err(p.error("literal expected")),
            },
        }
    }

    fn parse_args(&mut self) -> Result<Vec<MetaItem>> {
        let mut out = Vec::new();
        loop {
            self.parser.skip_ws();
            if self.parser.peek_char() == Some(')') {
                return Ok(out);
            }
            out.push(self.parse_node()?);
            self.parser.skip_ws();
            if !self.parser.consume_char(',') {
                return Ok(out);
            }
        }
    }
}
