//! Lenient JSON repair parser.
//!
//! Second stage of the parse pipeline, used only after strict parsing fails.
//! Handles the malformations generative models actually produce: prose before
//! the payload, single-quoted strings, unquoted keys, trailing or missing
//! commas, raw control characters inside strings, case-shifted literals, and
//! truncation (unterminated strings, arrays, and objects are closed
//! implicitly at end of input). This is not a general JSON-repair library.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("repair failed near position {pos}: {reason}")]
pub struct RepairError {
    pub pos: usize,
    pub reason: String,
}

/// Parse best-effort JSON from model output. The text is scanned forward to
/// the first `{` or `[` so leading prose does not break parsing.
pub fn repair_json(text: &str) -> Result<Value, RepairError> {
    let start = text
        .find(['{', '['])
        .ok_or_else(|| RepairError {
            pos: 0,
            reason: "no object or array found".to_string(),
        })?;
    let mut parser = Repairer {
        chars: text[start..].chars().collect(),
        pos: 0,
        offset: start,
    };
    parser.skip_ws();
    parser.parse_value()
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    /// Offset of `chars[0]` in the original text, for error positions.
    offset: usize,
}

impl Repairer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c.is_control() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn error(&self, reason: impl Into<String>) -> RepairError {
        RepairError {
            pos: self.offset + self.pos,
            reason: reason.into(),
        }
    }

    fn parse_value(&mut self) -> Result<Value, RepairError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(_) => self.parse_literal(),
        }
    }

    fn parse_object(&mut self) -> Result<Value, RepairError> {
        self.bump(); // '{'
        let mut map = Map::new();
        loop {
            self.skip_ws();
            match self.peek() {
                // Truncated object: close implicitly.
                None => break,
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_ws();
            match self.peek() {
                Some(':') => {
                    self.bump();
                }
                // Key with no value at end of input (truncation mid-member).
                None => {
                    map.insert(key, Value::Null);
                    break;
                }
                Some(c) => return Err(self.error(format!("expected ':' after key, found {c:?}"))),
            }
            let value = match self.parse_value() {
                Ok(v) => v,
                // Truncated after the colon.
                Err(_) if self.peek().is_none() => Value::Null,
                Err(e) => return Err(e),
            };
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self) -> Result<String, RepairError> {
        self.skip_ws();
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_alphanumeric() || c == '_' => {
                // Unquoted key: read until colon, comma, or brace.
                let mut key = String::new();
                while let Some(c) = self.peek() {
                    if c == ':' || c == ',' || c == '}' || c == '\n' {
                        break;
                    }
                    key.push(c);
                    self.pos += 1;
                }
                Ok(key.trim().to_string())
            }
            Some(c) => Err(self.error(format!("expected object key, found {c:?}"))),
            None => Err(self.error("expected object key, found end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, RepairError> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                // Truncated array: close implicitly.
                None => break,
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                _ => {}
            }
            let value = match self.parse_value() {
                Ok(v) => v,
                Err(_) if self.peek().is_none() => break,
                Err(e) => return Err(e),
            };
            items.push(value);
        }
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, RepairError> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                // Unterminated string: close implicitly at end of input.
                None => break,
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    None => break,
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{0008}'),
                    Some('f') => out.push('\u{000C}'),
                    Some('u') => {
                        let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(c) => out.push(c),
                            // Invalid escape: keep it verbatim.
                            None => {
                                out.push_str("\\u");
                                out.push_str(&hex);
                            }
                        }
                    }
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Value, RepairError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '+' || c == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        match raw.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(self.error(format!("invalid number {raw:?}"))),
        }
    }

    fn parse_literal(&mut self) -> Result<Value, RepairError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphabetic() {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "none" => Ok(Value::Null),
            _ => Err(self.error(format!("unexpected token {word:?}"))),
        }
    }
}
