use std::{fmt, iter::Peekable, str::CharIndices};

use super::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    In,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::Null => write!(f, "'null'"),
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::Not => write!(f, "'not'"),
            Token::In => write!(f, "'in'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::Dot => write!(f, "'.'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut chars = source.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match ch {
            '0'..='9' => lex_number(source, &mut chars)?,
            '"' | '\'' => lex_string(&mut chars)?,
            c if c.is_alphabetic() || c == '_' => lex_word(source, &mut chars),
            _ => lex_symbol(&mut chars, position, ch)?,
        };

        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

fn lex_number(
    source: &str,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Token, ExpressionError> {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(source.len());
    let mut end = start;
    let mut seen_dot = false;

    while let Some(&(i, c)) = chars.peek() {
        if c.is_ascii_digit() {
            end = i + 1;
            chars.next();
        } else if c == '.' && !seen_dot && next_is_digit(source, i + 1) {
            seen_dot = true;
            end = i + 1;
            chars.next();
        } else {
            break;
        }
    }

    let text = &source[start..end];
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ExpressionError::InvalidNumber(text.to_string()))
}

fn next_is_digit(source: &str, index: usize) -> bool {
    source[index..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

fn lex_string(chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ExpressionError> {
    let Some((start, quote)) = chars.next() else {
        return Err(ExpressionError::UnexpectedEnd);
    };
    let mut text = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(Token::Str(text)),
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, other)) => text.push(other),
                None => break,
            },
            c => text.push(c),
        }
    }

    Err(ExpressionError::UnterminatedString(start))
}

fn lex_word(source: &str, chars: &mut Peekable<CharIndices<'_>>) -> Token {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(source.len());
    let mut end = start;

    while let Some(&(i, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            end = i + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }

    match &source[start..end] {
        "true" | "True" => Token::True,
        "false" | "False" => Token::False,
        "null" | "None" => Token::Null,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        word => Token::Ident(word.to_string()),
    }
}

fn lex_symbol(
    chars: &mut Peekable<CharIndices<'_>>,
    position: usize,
    ch: char,
) -> Result<Token, ExpressionError> {
    chars.next();

    let token = match ch {
        '+' => Token::Plus,
        '-' => Token::Minus,
        '*' => Token::Star,
        '/' => Token::Slash,
        '%' => Token::Percent,
        '.' => Token::Dot,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        '=' if followed_by(chars, '=') => Token::Eq,
        '!' if followed_by(chars, '=') => Token::Ne,
        '!' => Token::Not,
        '<' if followed_by(chars, '=') => Token::Le,
        '<' => Token::Lt,
        '>' if followed_by(chars, '=') => Token::Ge,
        '>' => Token::Gt,
        '&' if followed_by(chars, '&') => Token::And,
        '|' if followed_by(chars, '|') => Token::Or,
        _ => return Err(ExpressionError::UnexpectedCharacter { ch, position }),
    };

    Ok(token)
}

fn followed_by(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    if chars.peek().is_some_and(|&(_, c)| c == expected) {
        chars.next();
        true
    } else {
        false
    }
}
