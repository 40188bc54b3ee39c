use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::none_of,
    combinator::recognize,
    multi::many0,
};

use crate::{
    error::{Error, Result},
    select::Cmp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Join,
    On,
    Where,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Join => "JOIN",
            Keyword::On => "ON",
            Keyword::Where => "WHERE",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        [
            Keyword::Select,
            Keyword::From,
            Keyword::Join,
            Keyword::On,
            Keyword::Where,
        ]
        .into_iter()
        .find(|kw| word.eq_ignore_ascii_case(kw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    Number(i64),
    Str(String),
    Cmp(Cmp),
    Comma,
    Dot,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "{}", kw.as_str()),
            TokenKind::Ident(name) => write!(f, "identifier {name:?}"),
            TokenKind::Number(n) => write!(f, "number {n}"),
            TokenKind::Str(s) => write!(f, "string {s:?}"),
            TokenKind::Cmp(cmp) => write!(f, "'{}'", cmp.symbol()),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Eof => write!(f, "end of query"),
        }
    }
}

/// A single token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub at: usize,
}

/// Splits `src` into tokens, always ending with [`TokenKind::Eof`].
/// Whitespace between tokens is skipped; a character that starts no token is
/// an [`Error::Lex`] at its offset.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = src;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        let at = src.len() - rest.len();
        let Some(found) = rest.chars().next() else {
            break;
        };
        match lexeme(rest) {
            Ok((r, kind)) => {
                tokens.push(Token { kind, at });
                rest = r;
            }
            Err(nom::Err::Failure(_)) => {
                return Err(Error::InvalidValue(format!(
                    "number literal out of range at offset {at}"
                )));
            }
            Err(_) => return Err(Error::Lex { found, at }),
        }
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        at: src.len(),
    });
    Ok(tokens)
}

fn lexeme(i: &str) -> IResult<&str, TokenKind> {
    alt((comparison, punctuation, str_literal, word)).parse(i)
}

fn comparison(i: &str) -> IResult<&str, TokenKind> {
    // The order matters! Two-character operators must win over their
    // one-character prefixes.
    let (r, op) = alt((
        tag("<="),
        tag(">="),
        tag("<>"),
        tag("="),
        tag("<"),
        tag(">"),
    ))
    .parse(i)?;

    Ok((
        r,
        TokenKind::Cmp(match op {
            "=" => Cmp::Eq,
            "<>" => Cmp::Ne,
            "<" => Cmp::Lt,
            ">" => Cmp::Gt,
            "<=" => Cmp::Le,
            ">=" => Cmp::Ge,
            _ => unreachable!(),
        }),
    ))
}

fn punctuation(i: &str) -> IResult<&str, TokenKind> {
    let (r, c) = alt((tag(","), tag("."))).parse(i)?;
    Ok((
        r,
        match c {
            "," => TokenKind::Comma,
            _ => TokenKind::Dot,
        },
    ))
}

/// Single-quoted string with no escape processing; the content between the
/// quotes is taken literally.
fn str_literal(i: &str) -> IResult<&str, TokenKind> {
    let (r, _) = tag("'").parse(i)?;
    let (r, s) = recognize(many0(none_of("'"))).parse(r)?;
    let (r, _) = tag("'").parse(r)?;
    Ok((r, TokenKind::Str(s.to_string())))
}

/// A run of `[A-Za-z0-9_]`: a keyword (case-insensitively), a decimal number
/// if it is all digits, or an identifier kept verbatim.
fn word(i: &str) -> IResult<&str, TokenKind> {
    let (r, w) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(i)?;

    let kind = if let Some(kw) = Keyword::from_word(w) {
        TokenKind::Keyword(kw)
    } else if w.bytes().all(|b| b.is_ascii_digit()) {
        match w.parse::<i64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    i,
                    nom::error::ErrorKind::Verify,
                )));
            }
        }
    } else {
        TokenKind::Ident(w.to_string())
    };

    Ok((r, kind))
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_any_case() {
        assert_eq!(
            kinds("select SELECT SeLeCt"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_idents_verbatim() {
        assert_eq!(
            kinds("Employees dept_id x9"),
            vec![
                TokenKind::Ident("Employees".to_string()),
                TokenKind::Ident("dept_id".to_string()),
                TokenKind::Ident("x9".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("42 'I, Robot' ''"),
            vec![
                TokenKind::Number(42),
                TokenKind::Str("I, Robot".to_string()),
                TokenKind::Str(String::new()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_greedy() {
        assert_eq!(
            kinds("<= >= <> < > ="),
            vec![
                TokenKind::Cmp(Cmp::Le),
                TokenKind::Cmp(Cmp::Ge),
                TokenKind::Cmp(Cmp::Ne),
                TokenKind::Cmp(Cmp::Lt),
                TokenKind::Cmp(Cmp::Gt),
                TokenKind::Cmp(Cmp::Eq),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a<=b"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Cmp(Cmp::Le),
                TokenKind::Ident("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_column_id_is_three_tokens() {
        assert_eq!(
            kinds("t.c"),
            vec![
                TokenKind::Ident("t".to_string()),
                TokenKind::Dot,
                TokenKind::Ident("c".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("a = 1\nb").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.at).collect();
        assert_eq!(offsets, vec![0, 2, 4, 6, 7]);
    }

    #[test]
    fn test_lex_error() {
        assert_eq!(
            tokenize("a ; b").unwrap_err(),
            Error::Lex { found: ';', at: 2 }
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            tokenize("x 'abc").unwrap_err(),
            Error::Lex { found: '\'', at: 2 }
        );
    }

    #[test]
    fn test_number_out_of_range() {
        assert!(matches!(
            tokenize("99999999999999999999").unwrap_err(),
            Error::InvalidValue(_)
        ));
    }
}
