//! Tokens of a single text-header statement and string escaping.

use std::fmt;

/// One word of a statement: a bare word or a double-quoted string
/// (stored unescaped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Bare(text) | Token::Quoted(text) => text,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Token::Bare(text) if text.starts_with('-'))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bare(text) => f.write_str(text),
            Token::Quoted(text) => write!(f, "\"{}\"", escape(text)),
        }
    }
}

/// Escapes a value for a double-quoted string.
///
/// A backslash is only doubled where [`unescape`] would otherwise read it
/// as the start of an escape, so `C:\qdir` is written as it came in.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next) if !starts_escape(next) => out.push('\\'),
                _ => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Whether a backslash followed by `c`, once escaped, reads as an escape.
fn starts_escape(c: char) -> bool {
    matches!(c, '\\' | '"' | 'n' | 'r' | 't' | '\n' | '\r' | '\t')
}

/// Inverse of [`escape`]. A backslash before any other character is kept.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '"')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits the arguments of a statement into tokens, ignoring the closing
/// `;`. Returns `None` when a quoted string is left open.
pub fn tokenize(args: &str) -> Option<Vec<Token>> {
    let args = args.trim_end();
    let args = args.strip_suffix(';').unwrap_or(args);

    let mut tokens = Vec::new();
    let mut chars = args.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut raw = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        raw.push(c);
                        raw.push(chars.next()?);
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    c => raw.push(c),
                }
            }
            if !closed {
                return None;
            }
            tokens.push(Token::Quoted(unescape(&raw)));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Bare(word));
        }
    }

    Some(tokens)
}
