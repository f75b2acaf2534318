// src/parser.rs
use crate::errors::{EvalError, Result};

/// Character scanner shared by the text front ends.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn error(&self, msg: impl Into<String>) -> EvalError {
        EvalError::Parse(format!("{} at offset {}", msg.into(), self.i))
    }

    pub fn parse_identifier(&mut self) -> Result<String> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(self.error("identifier expected"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// `ident` or `ident::ident::..`, returned joined with `::`.
    pub fn parse_path(&mut self) -> Result<String> {
        let mut path = self.parse_identifier()?;
        loop {
            self.skip_ws();
            if !self.peek_str("::") {
                return Ok(path);
            }
            self.i += 2;
            self.skip_ws();
            path.push_str("::");
            path.push_str(&self.parse_identifier()?);
        }
    }

    /// Integer or float literal token, suffix included (`1`, `-2.5`, `8u32`).
    pub fn parse_number(&mut self) -> Result<String> {
        let start = self.i;
        self.consume_char('-');
        if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.error("number expected"));
        }
        while let Some(c) = self.peek_char() {
            if c == '_' || c == '.' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// `r"..."` or `r#"..."#` with any number of hashes; no escapes.
    pub fn parse_raw_string(&mut self) -> Result<String> {
        self.expect('r')?;
        let mut hashes = 0;
        while self.consume_char('#') {
            hashes += 1;
        }
        self.expect('"')?;
        let closing = format!("\"{}", "#".repeat(hashes));
        let start = self.i;
        match self.s[start..].find(&closing) {
            Some(len) => {
                self.i = start + len + closing.len();
                Ok(self.s[start..start + len].to_string())
            }
            None => Err(self.error("unterminated raw string")),
        }
    }

    pub fn parse_quoted_string(&mut self) -> Result<String> {
        let quote = self.peek_char().ok_or_else(|| self.error("string expected"))?;
        if quote != '\'' && quote != '"' {
            return Err(self.error("expected quoted string"));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(self.error("unterminated string"))
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
