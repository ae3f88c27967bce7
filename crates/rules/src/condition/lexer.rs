//! Tokenizer for condition expressions.
//!
//! Boolean literals are recognised case-insensitively (`true`, `True`,
//! `TRUE`), so rule authors can use either spelling.

use super::error::ConditionSyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token start.
    pub pos: usize,
}

/// Statement keywords that have no place in a condition.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "import", "from", "lambda", "def", "class", "for", "while", "if", "else", "elif", "return",
    "yield", "with", "global", "del", "exec", "eval", "is",
];

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ConditionSyntaxError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let kind = match c {
            b'0'..=b'9' => {
                let (kind, end) = lex_number(src, start)?;
                i = end;
                tokens.push(Token { kind, pos: start });
                continue;
            }
            b'.' if bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit()) => {
                let (kind, end) = lex_number(src, start)?;
                i = end;
                tokens.push(Token { kind, pos: start });
                continue;
            }
            b'\'' | b'"' => {
                let (s, end) = lex_string(src, start)?;
                i = end;
                tokens.push(Token {
                    kind: TokenKind::Str(s),
                    pos: start,
                });
                continue;
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                let mut end = i;
                while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric()) {
                    end += 1;
                }
                let word = &src[start..end];
                i = end;
                tokens.push(Token {
                    kind: keyword_or_ident(word, start)?,
                    pos: start,
                });
                continue;
            }
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'%' => TokenKind::Percent,
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    return Err(ConditionSyntaxError::new(start, "exponentiation is not supported"));
                }
                TokenKind::Star
            }
            b'/' => {
                if bytes.get(i + 1) == Some(&b'/') {
                    i += 1;
                    TokenKind::SlashSlash
                } else {
                    TokenKind::Slash
                }
            }
            b'=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                    TokenKind::Eq
                } else {
                    return Err(ConditionSyntaxError::new(start, "assignment is not allowed, use '=='"));
                }
            }
            b'!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            b'<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                    TokenKind::LtEq
                } else if bytes.get(i + 1) == Some(&b'>') {
                    i += 1;
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                i += 1;
                TokenKind::And
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                i += 1;
                TokenKind::Or
            }
            _ => {
                let ch = src[start..].chars().next().unwrap_or('?');
                return Err(ConditionSyntaxError::new(start, format!("unexpected character '{}'", ch)));
            }
        };
        i += 1;
        tokens.push(Token { kind, pos: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: src.len(),
    });
    Ok(tokens)
}

fn keyword_or_ident(word: &str, pos: usize) -> Result<TokenKind, ConditionSyntaxError> {
    if word.eq_ignore_ascii_case("true") {
        return Ok(TokenKind::True);
    }
    if word.eq_ignore_ascii_case("false") {
        return Ok(TokenKind::False);
    }
    match word {
        "None" | "none" | "null" => Ok(TokenKind::None),
        "and" | "AND" => Ok(TokenKind::And),
        "or" | "OR" => Ok(TokenKind::Or),
        "not" | "NOT" => Ok(TokenKind::Not),
        "in" | "IN" => Ok(TokenKind::In),
        w if FORBIDDEN_KEYWORDS.contains(&w) => Err(ConditionSyntaxError::new(
            pos,
            format!("keyword '{}' is not allowed in a condition", w),
        )),
        w if w.starts_with("__") => Err(ConditionSyntaxError::new(
            pos,
            format!("dunder name '{}' is not allowed", w),
        )),
        w => Ok(TokenKind::Ident(w.to_string())),
    }
}

fn lex_number(src: &str, start: usize) -> Result<(TokenKind, usize), ConditionSyntaxError> {
    let bytes = src.as_bytes();
    let mut end = start;
    let mut is_float = false;

    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' && bytes.get(end + 1).map_or(true, |b| !b.is_ascii_alphabetic() || *b == b'e' || *b == b'E') {
        is_float = true;
        end += 1;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
            end += 1;
        }
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        if exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            is_float = true;
            end = exp_end;
        }
    }

    let text: String = src[start..end].chars().filter(|c| *c != '_').collect();
    let kind = if is_float {
        text.parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| ConditionSyntaxError::new(start, format!("invalid number '{}'", &src[start..end])))?
    } else {
        match text.parse::<i64>() {
            Ok(v) => TokenKind::Int(v),
            // Out of i64 range: keep the magnitude as a float.
            Err(_) => text
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| ConditionSyntaxError::new(start, format!("invalid number '{}'", &src[start..end])))?,
        }
    };

    if end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphabetic()) {
        return Err(ConditionSyntaxError::new(end, "invalid character in number literal"));
    }
    Ok((kind, end))
}

fn lex_string(src: &str, start: usize) -> Result<(String, usize), ConditionSyntaxError> {
    let mut chars = src[start..].char_indices();
    let (_, quote) = chars.next().ok_or_else(|| ConditionSyntaxError::new(start, "expected string"))?;
    let mut out = String::new();

    while let Some((off, ch)) = chars.next() {
        match ch {
            c if c == quote => return Ok((out, start + off + c.len_utf8())),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '\'')) => out.push('\''),
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            c => out.push(c),
        }
    }

    Err(ConditionSyntaxError::new(start, "unterminated string literal"))
}
