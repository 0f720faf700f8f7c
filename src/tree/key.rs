// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Dotted key paths such as `database.host`, `servers."eu.west".port` or
//! `servers.'eu.west'.port`.

use crate::error::KeyError;
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// A parsed dotted key path.
///
/// Bare segments may hold anything except `.`, `"` and `'`, with surrounding
/// whitespace trimmed. Double-quoted segments may hold dots and support the
/// `\"` and `\\` escapes. Single-quoted segments are literal, as in TOML:
/// no escapes, and they cannot contain `'`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted key path.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.trim().is_empty() {
            return Err(KeyError::Empty);
        }

        let mut segments = Vec::new();
        let mut chars = raw.chars().peekable();

        loop {
            skip_whitespace(&mut chars);

            let segment = match chars.peek() {
                Some('"') => {
                    chars.next();
                    parse_quoted(&mut chars, raw)?
                }
                Some('\'') => {
                    chars.next();
                    parse_literal(&mut chars, raw)?
                }
                _ => parse_bare(&mut chars, raw)?,
            };
            segments.push(segment);

            skip_whitespace(&mut chars);
            match chars.next() {
                None => break,
                Some('.') => continue,
                Some(c) => {
                    return Err(KeyError::Malformed {
                        key: raw.to_string(),
                        message: format!("unexpected '{}' after quoted segment", c),
                    });
                }
            }
        }

        Ok(Self { segments })
    }

    /// The individual segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path made of the first `len` segments, rendered as a dotted key.
    pub fn prefix(&self, len: usize) -> String {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
        .to_string()
    }

    /// Whether `self` equals `other` or one is an ancestor of the other.
    pub fn overlaps(&self, other: &KeyPath) -> bool {
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }
}

impl FromStr for KeyPath {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if is_bare(segment) {
                f.write_str(segment)?;
            } else {
                write!(f, "\"{}\"", segment.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

fn is_bare(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

fn parse_bare(chars: &mut Peekable<Chars<'_>>, raw: &str) -> Result<String, KeyError> {
    let mut segment = String::new();

    while let Some(&c) = chars.peek() {
        match c {
            '.' => break,
            '"' | '\'' => {
                return Err(KeyError::Malformed {
                    key: raw.to_string(),
                    message: "quote inside a bare segment".to_string(),
                });
            }
            _ => {
                segment.push(c);
                chars.next();
            }
        }
    }

    let segment = segment.trim_end();
    if segment.is_empty() {
        return Err(KeyError::EmptySegment {
            key: raw.to_string(),
        });
    }
    Ok(segment.to_string())
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>, raw: &str) -> Result<String, KeyError> {
    let mut segment = String::new();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(segment),
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => segment.push(escaped),
                Some(other) => {
                    return Err(KeyError::Malformed {
                        key: raw.to_string(),
                        message: format!("unsupported escape '\\{}'", other),
                    });
                }
                None => break,
            },
            _ => segment.push(c),
        }
    }

    Err(KeyError::Malformed {
        key: raw.to_string(),
        message: "unterminated quoted segment".to_string(),
    })
}

fn parse_literal(chars: &mut Peekable<Chars<'_>>, raw: &str) -> Result<String, KeyError> {
    let mut segment = String::new();

    for c in chars.by_ref() {
        if c == '\'' {
            return Ok(segment);
        }
        segment.push(c);
    }

    Err(KeyError::Malformed {
        key: raw.to_string(),
        message: "unterminated literal segment".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_segments() {
        let path = KeyPath::parse("database.host").unwrap();
        assert_eq!(path.segments(), ["database", "host"]);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let path = KeyPath::parse(" section . d ").unwrap();
        assert_eq!(path.segments(), ["section", "d"]);
    }

    #[test]
    fn test_parse_quoted_segment_with_dot() {
        let path = KeyPath::parse(r#"servers."eu.west".port"#).unwrap();
        assert_eq!(path.segments(), ["servers", "eu.west", "port"]);
    }

    #[test]
    fn test_parse_quoted_escapes() {
        let path = KeyPath::parse(r#""say \"hi\"""#).unwrap();
        assert_eq!(path.segments(), [r#"say "hi""#]);
    }

    #[test]
    fn test_parse_literal_segment_with_dot() {
        let path = KeyPath::parse("servers.'eu.west'.port").unwrap();
        assert_eq!(path.segments(), ["servers", "eu.west", "port"]);
        assert_eq!(path, KeyPath::parse(r#"servers."eu.west".port"#).unwrap());

        let raw = KeyPath::parse(r"'C:\dir'").unwrap();
        assert_eq!(raw.segments(), [r"C:\dir"]);
    }

    #[test]
    fn test_parse_rejects_malformed_literals() {
        assert!(matches!(
            KeyPath::parse("servers.'eu.west"),
            Err(KeyError::Malformed { .. })
        ));
        assert!(matches!(
            KeyPath::parse("a.'b'c"),
            Err(KeyError::Malformed { .. })
        ));
        assert!(matches!(
            KeyPath::parse("it's"),
            Err(KeyError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(KeyPath::parse(""), Err(KeyError::Empty));
        assert_eq!(KeyPath::parse("   "), Err(KeyError::Empty));
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(matches!(
            KeyPath::parse("a..b"),
            Err(KeyError::EmptySegment { .. })
        ));
        assert!(matches!(
            KeyPath::parse("a."),
            Err(KeyError::EmptySegment { .. })
        ));
        assert!(matches!(
            KeyPath::parse(".a"),
            Err(KeyError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_quotes() {
        assert!(matches!(
            KeyPath::parse(r#"a."b"#),
            Err(KeyError::Malformed { .. })
        ));
        assert!(matches!(
            KeyPath::parse(r#"a."b"c"#),
            Err(KeyError::Malformed { .. })
        ));
        assert!(matches!(
            KeyPath::parse(r#"a"b"#),
            Err(KeyError::Malformed { .. })
        ));
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let path = KeyPath::parse(r#"servers."eu.west".port"#).unwrap();
        assert_eq!(path.to_string(), r#"servers."eu.west".port"#);
        assert_eq!(path.prefix(1), "servers");
    }

    #[test]
    fn test_overlaps() {
        let a = KeyPath::parse("a").unwrap();
        let ab = KeyPath::parse("a.b").unwrap();
        let ac = KeyPath::parse("a.c").unwrap();
        assert!(a.overlaps(&ab));
        assert!(ab.overlaps(&a));
        assert!(ab.overlaps(&ab));
        assert!(!ab.overlaps(&ac));
    }
}
