// expression/lexer.rs
// Splits expression source into number, identifier and operator tokens

use super::ExpressionError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    /// Identifier, possibly dotted (`Math.sin`).
    Ident(String),
    Op(&'static str),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Character offset of the first character of the token.
    pub pos: usize,
}

impl Token {
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(v) => v.to_string(),
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Op(op) => (*op).to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

const TWO_CHAR_OPS: [&str; 7] = ["**", "&&", "||", "==", "!=", "<=", ">="];
const ONE_CHAR_OPS: [&str; 13] = ["+", "-", "*", "/", "%", "<", ">", "!", "(", ")", ",", "?", ":"];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();
        if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            let (value, end) = lex_number(&chars, i)?;
            tokens.push(Token { kind: TokenKind::Number(value), pos: i });
            i = end;
            continue;
        }

        if is_ident_start(c) {
            let (name, end) = lex_identifier(&chars, i);
            tokens.push(Token { kind: TokenKind::Ident(name), pos: i });
            i = end;
            continue;
        }

        if let Some(next) = next {
            let pair: String = [c, next].iter().collect();
            if let Some(op) = TWO_CHAR_OPS.iter().find(|op| **op == pair) {
                tokens.push(Token { kind: TokenKind::Op(*op), pos: i });
                i += 2;
                continue;
            }
        }

        let single = c.to_string();
        if let Some(op) = ONE_CHAR_OPS.iter().find(|op| **op == single) {
            tokens.push(Token { kind: TokenKind::Op(*op), pos: i });
            i += 1;
            continue;
        }

        return Err(ExpressionError::new(format!("Unexpected character \"{}\"", c), i));
    }

    tokens.push(Token { kind: TokenKind::Eof, pos: chars.len() });
    Ok(tokens)
}

/// `(\d+\.\d*|\d+|\.\d+)([eE][+-]?\d+)?`
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ExpressionError> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        let digits_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((value, i)),
        _ => Err(ExpressionError::new("Invalid number literal", start)),
    }
}

fn lex_identifier(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start + 1;
    while i < chars.len() && is_ident_continue(chars[i]) {
        i += 1;
    }
    // Dotted segments only continue when a valid identifier follows the dot.
    while i + 1 < chars.len() && chars[i] == '.' && is_ident_start(chars[i + 1]) {
        i += 2;
        while i < chars.len() && is_ident_continue(chars[i]) {
            i += 1;
        }
    }
    (chars[start..i].iter().collect(), i)
}

/// True when `name` is a plain (undotted) identifier.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue),
        _ => false,
    }
}
