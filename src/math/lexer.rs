use std::iter::Peekable;
use std::str::CharIndices;

use crate::math::error::ParseError;
use crate::types::{Fun, Op, Token};

/// Longest token stream accepted. Every later stage walks the tree recursively.
pub const MAX_TOKENS: usize = 2_048;

pub struct Lexer;

impl Lexer {
    /// Tokenizes `input` with `variable` as the only free identifier.
    ///
    /// Whitespace is dropped and the text lower-cased before anything else, and
    /// implied multiplication (`2x`, `x2`, `3(x+1)`, `x(x+1)`) is made explicit in
    /// the returned stream.
    pub fn tokenize(input: &str, variable: &str) -> Result<Vec<Token>, ParseError> {
        let src = clean(input);
        let variable = variable.to_lowercase();
        let mut tokens = Vec::new();
        let mut chars = src.char_indices().peekable();

        while let Some(&(pos, c)) = chars.peek() {
            if tokens.len() >= MAX_TOKENS {
                return Err(ParseError::unexpected(
                    &src,
                    (pos, c.len_utf8()),
                    &c.to_string(),
                    &format!("Expression is longer than {MAX_TOKENS} tokens"),
                ));
            }

            if c.is_ascii_digit() || c == '.' {
                tokens.push(parse_value(&src, &mut chars)?);
                continue;
            }

            if c == '(' {
                tokens.push(Token::ParOpen);
                chars.next();
                continue;
            }

            if c == ')' {
                tokens.push(Token::ParClose);
                chars.next();
                continue;
            }

            if matches!(c, '+' | '-' | '*' | '/' | '^') {
                chars.next();
                let op = match c {
                    '+' => Op::Add,
                    '-' => Op::Sub,
                    '*' => match chars.next_if(|&(_, n)| n == '*') {
                        Some(_) => Op::Pow,
                        None => Op::Mul,
                    },
                    '/' => Op::Div,
                    _ => Op::Pow,
                };
                tokens.push(Token::Op(op));
                continue;
            }

            if c.is_alphabetic() {
                tokens.extend(parse_alphabetic(&src, &mut chars, &variable)?);
                continue;
            }

            return Err(ParseError::unexpected(
                &src,
                (pos, c.len_utf8()),
                &c.to_string(),
                "Unexpected character",
            ));
        }

        Ok(insert_implied_mul(tokens))
    }
}

/// Strips all whitespace and lower-cases, the form every later stage sees.
pub fn clean(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn parse_value(src: &str, chars: &mut Peekable<CharIndices>) -> Result<Token, ParseError> {
    let start = chars.peek().map_or(src.len(), |&(pos, _)| pos);
    let mut value_str = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            value_str.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match value_str.parse::<f64>() {
        Ok(value) => Ok(Token::Val(value)),
        Err(e) => Err(ParseError::unexpected(
            src,
            (start, value_str.len()),
            &value_str,
            &format!("Failed to parse value: '{e}'"),
        )),
    }
}

/// Splits a run of letters into function names and the variable, longest
/// keyword first, so `sin` never degrades into `s*i*n` and `exp` wins over a
/// variable called `e`.
fn parse_alphabetic(
    src: &str,
    chars: &mut Peekable<CharIndices>,
    variable: &str,
) -> Result<Vec<Token>, ParseError> {
    let start = chars.peek().map_or(src.len(), |&(pos, _)| pos);
    let mut end = start;
    while let Some(&(pos, c)) = chars.peek() {
        if c.is_alphabetic() {
            end = pos + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }

    let word = &src[start..end];
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < word.len() {
        let rest = &word[offset..];
        match longest_keyword(rest, variable) {
            Some((token, len)) => {
                tokens.push(token);
                offset += len;
            }
            None => {
                let unknown_len = rest
                    .char_indices()
                    .skip(1)
                    .find(|&(i, _)| longest_keyword(&rest[i..], variable).is_some())
                    .map_or(rest.len(), |(i, _)| i);
                return Err(ParseError::unknown_identifier(
                    src,
                    (start + offset, unknown_len),
                    &rest[..unknown_len],
                    variable,
                ));
            }
        }
    }
    Ok(tokens)
}

fn longest_keyword(word: &str, variable: &str) -> Option<(Token, usize)> {
    let function = Fun::ALL
        .iter()
        .filter(|fun| word.starts_with(fun.name()))
        .max_by_key(|fun| fun.name().len())
        .map(|fun| (Token::Fun(*fun), fun.name().len()));
    let var = (!variable.is_empty() && word.starts_with(variable))
        .then(|| (Token::Var(variable.to_string()), variable.len()));

    match (function, var) {
        (Some(f), Some(v)) => Some(if v.1 > f.1 { v } else { f }),
        (f, v) => f.or(v),
    }
}

fn should_insert_mul(current: &Token, next: &Token) -> bool {
    matches!(
        (current, next),
        (
            Token::Val(_) | Token::Var(_) | Token::ParClose,
            Token::Var(_) | Token::Fun(_) | Token::ParOpen
        ) | (Token::Var(_) | Token::ParClose, Token::Val(_))
    )
}

fn insert_implied_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut it = tokens.into_iter().peekable();
    while let Some(token) = it.next() {
        let mul = it.peek().is_some_and(|next| should_insert_mul(&token, next));
        result.push(token);
        if mul {
            result.push(Token::Op(Op::Mul));
        }
    }
    result
}
