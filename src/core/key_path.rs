//! Key paths for nested metadata access
//!
//! Supports dot notation (`author.name`), bracket notation
//! (`author['name']`), numeric indices into sequences (`tags[0]`) and quoted
//! keys containing dots (`"key.with.dots"`).

use crate::error::{GendokuError, Result};
use std::fmt;

/// A parsed key path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Create a key path from multiple segments
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a key path from a string
    pub fn parse(input: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut parser = PathParser::new(input);

        while !parser.is_at_end() {
            let segment = parser.parse_segment()?;
            if !segment.is_empty() {
                segments.push(segment);
            }
        }

        Ok(Self::from_segments(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Convert to dot notation string
    pub fn to_dot_notation(&self) -> String {
        self.segments
            .iter()
            .map(|s| escape_key_for_dot_notation(s))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dot_notation())
    }
}

struct PathParser<'a> {
    input: &'a str,
    chars: std::str::Chars<'a>,
    current: Option<char>,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn parse_segment(&mut self) -> Result<String> {
        self.skip_whitespace();

        match self.current {
            None => Ok(String::new()),
            Some('[') => self.parse_bracket_segment(),
            Some(quote @ ('"' | '\'')) => self.parse_quoted_segment(quote),
            Some('.') => {
                self.advance();
                self.parse_segment()
            }
            Some(_) => Ok(self.take_until(&['.', '['])),
        }
    }

    fn parse_bracket_segment(&mut self) -> Result<String> {
        self.advance();
        self.skip_whitespace();

        let segment = match self.current {
            Some(quote @ ('"' | '\'')) => self.parse_quoted_segment(quote)?,
            _ => self.take_until(&[']']),
        };

        self.skip_whitespace();
        if self.current != Some(']') {
            return Err(self.invalid("missing closing bracket"));
        }
        self.advance();
        Ok(segment)
    }

    fn parse_quoted_segment(&mut self, quote: char) -> Result<String> {
        self.advance();

        let mut result = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current {
            if escaped {
                match ch {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    '\\' | '\'' | '"' => result.push(ch),
                    _ => {
                        result.push('\\');
                        result.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                self.advance();
                return Ok(result);
            } else {
                result.push(ch);
            }
            self.advance();
        }

        Err(self.invalid("unterminated quoted string"))
    }

    fn take_until(&mut self, stops: &[char]) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current {
            if stops.contains(&ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result.trim().to_string()
    }

    fn skip_whitespace(&mut self) {
        while self.current.is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn invalid(&self, reason: &str) -> GendokuError {
        GendokuError::missing_key(format!("{} ({reason})", self.input))
    }
}

fn escape_key_for_dot_notation(key: &str) -> String {
    if key.contains('.') || key.contains('"') || key.contains('\\') {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        key.to_string()
    }
}
