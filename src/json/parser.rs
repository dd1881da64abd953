use super::value::JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Parse failure with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub reason: String,
    pub position: usize,
}

impl ParseError {
    fn new(reason: impl Into<String>, position: usize) -> Self {
        ParseError {
            reason: reason.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.reason, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Parse a complete JSON document.
///
/// The whole input must be consumed; trailing non-whitespace is an error.
pub fn parse(text: &str) -> Result<JsonValue, ParseError> {
    JsonParser::new(text).parse()
}

/// Recursive-descent parser over the raw input bytes.
///
/// Accepts the RFC 8259 grammar with a strict number profile (no leading
/// zeros, no bare trailing `.`, exponents need digits) and the eight
/// standard escapes plus `\uXXXX`. Code units at or below 0x7F decode to
/// one UTF-8 byte, at or below 0x7FF to two, anything else to three;
/// surrogate pairs are never combined.
pub struct JsonParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> JsonParser<'a> {
    pub fn new(text: &'a str) -> Self {
        JsonParser {
            input: text.as_bytes(),
            pos: 0,
        }
    }

    pub fn parse(mut self) -> Result<JsonValue, ParseError> {
        self.skip_ws();
        let value = self.parse_value()?;
        self.skip_ws();
        if self.pos != self.input.len() {
            return Err(ParseError::new(
                "extra characters after valid JSON",
                self.pos,
            ));
        }
        Ok(value)
    }

    fn skip_ws(&mut self) {
        while let Some(&b) = self.input.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Result<u8, ParseError> {
        let byte = self
            .peek()
            .ok_or_else(|| ParseError::new("unexpected end of input", self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect_literal(&mut self, literal: &str, value: JsonValue) -> Result<JsonValue, ParseError> {
        if self.input[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(ParseError::new(format!("expected '{literal}'"), self.pos))
        }
    }

    fn parse_value(&mut self) -> Result<JsonValue, ParseError> {
        match self.peek() {
            None => Err(ParseError::new(
                "unexpected end of input while parsing value",
                self.pos,
            )),
            Some(b'n') => self.expect_literal("null", JsonValue::Null),
            Some(b't') => self.expect_literal("true", JsonValue::Bool(true)),
            Some(b'f') => self.expect_literal("false", JsonValue::Bool(false)),
            Some(b'"') => self.parse_string().map(JsonValue::String),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_object(),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.parse_number(),
            Some(b) => Err(ParseError::new(
                format!("unexpected character while parsing value: '{}'", b as char),
                self.pos,
            )),
        }
    }

    fn parse_number(&mut self) -> Result<JsonValue, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            _ => return Err(ParseError::new("invalid number", self.pos)),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(ParseError::new("invalid number", self.pos));
            }
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(ParseError::new("invalid number", self.pos));
            }
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        // The validated slice is ASCII and well-formed float syntax.
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| ParseError::new("invalid number", start))?;
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::new("invalid number", start))?;
        Ok(JsonValue::Number(value))
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        if self.next_byte()? != b'"' {
            return Err(ParseError::new(
                "expected opening quote for string",
                self.pos - 1,
            ));
        }

        let mut result = String::new();
        loop {
            let byte = match self.next_byte() {
                Ok(b) => b,
                Err(_) => return Err(ParseError::new("unterminated string", self.pos)),
            };
            match byte {
                b'"' => break,
                b'\\' => {
                    let escape = match self.next_byte() {
                        Ok(b) => b,
                        Err(_) => {
                            return Err(ParseError::new("unterminated escape sequence", self.pos))
                        }
                    };
                    match escape {
                        b'"' => result.push('"'),
                        b'\\' => result.push('\\'),
                        b'/' => result.push('/'),
                        b'b' => result.push('\u{0008}'),
                        b'f' => result.push('\u{000C}'),
                        b'n' => result.push('\n'),
                        b'r' => result.push('\r'),
                        b't' => result.push('\t'),
                        b'u' => {
                            let code = self.parse_unicode_escape()?;
                            // Lone surrogate code units cannot live in a Rust
                            // string; they decode to U+FFFD. Pairs are not
                            // combined.
                            let ch = char::from_u32(code)
                                .unwrap_or(char::REPLACEMENT_CHARACTER);
                            result.push(ch);
                        }
                        _ => {
                            return Err(ParseError::new(
                                "invalid escape character in string",
                                self.pos - 1,
                            ))
                        }
                    }
                }
                _ => {
                    // Raw byte of a UTF-8 sequence; copied through verbatim.
                    // Safe because the input slice came from a &str.
                    let rest = &self.input[self.pos - 1..];
                    let ch_len = utf8_len(byte);
                    let chunk = std::str::from_utf8(&rest[..ch_len.min(rest.len())])
                        .map_err(|_| ParseError::new("invalid utf-8 in string", self.pos - 1))?;
                    result.push_str(chunk);
                    self.pos += ch_len - 1;
                }
            }
        }
        Ok(result)
    }

    fn parse_unicode_escape(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let byte = match self.next_byte() {
                Ok(b) => b,
                Err(_) => return Err(ParseError::new("invalid unicode escape", self.pos)),
            };
            let nibble = match byte {
                b'0'..=b'9' => u32::from(byte - b'0'),
                b'a'..=b'f' => u32::from(byte - b'a' + 10),
                b'A'..=b'F' => u32::from(byte - b'A' + 10),
                _ => return Err(ParseError::new("invalid unicode escape", self.pos - 1)),
            };
            code = (code << 4) | nibble;
        }
        Ok(code)
    }

    fn parse_array(&mut self) -> Result<JsonValue, ParseError> {
        self.pos += 1; // consume '['
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(JsonValue::Array(items));
        }
        loop {
            self.skip_ws();
            items.push(self.parse_value()?);
            self.skip_ws();
            match self.next_byte() {
                Ok(b']') => break,
                Ok(b',') => continue,
                Ok(_) => {
                    return Err(ParseError::new("expected ',' or ']' in array", self.pos - 1))
                }
                Err(_) => return Err(ParseError::new("unterminated array", self.pos)),
            }
        }
        Ok(JsonValue::Array(items))
    }

    fn parse_object(&mut self) -> Result<JsonValue, ParseError> {
        self.pos += 1; // consume '{'
        let mut map = HashMap::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(JsonValue::Object(map));
        }
        loop {
            self.skip_ws();
            if self.peek() != Some(b'"') {
                return Err(ParseError::new("expected string key in object", self.pos));
            }
            let key = self.parse_string()?;
            self.skip_ws();
            match self.next_byte() {
                Ok(b':') => {}
                _ => {
                    return Err(ParseError::new(
                        "expected ':' after key in object",
                        self.pos.saturating_sub(1),
                    ))
                }
            }
            self.skip_ws();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.next_byte() {
                Ok(b'}') => break,
                Ok(b',') => continue,
                Ok(_) => {
                    return Err(ParseError::new(
                        "expected ',' or '}' in object",
                        self.pos - 1,
                    ))
                }
                Err(_) => return Err(ParseError::new("unterminated object", self.pos)),
            }
        }
        Ok(JsonValue::Object(map))
    }
}

/// Length in bytes of the UTF-8 sequence starting with `first`.
fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
