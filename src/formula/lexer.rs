use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Function names and the `true`/`false`/`null` keywords
    Ident(String),
    // Punctuation
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // Logical operators
    Bang,
    AndAnd,
    OrOr,
    // Comparison operators
    EqEqEq,
    NotEqEq,
    EqEq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    // End of input
    Eof,
}

impl Token {
    /// Source-like spelling, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => crate::coerce::format_number(*n),
            Token::Str(s) => format!("{:?}", s),
            Token::Ident(name) => name.clone(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Comma => ",".into(),
            Token::Question => "?".into(),
            Token::Colon => ":".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::Percent => "%".into(),
            Token::Bang => "!".into(),
            Token::AndAnd => "&&".into(),
            Token::OrOr => "||".into(),
            Token::EqEqEq => "===".into(),
            Token::NotEqEq => "!==".into(),
            Token::EqEq => "==".into(),
            Token::NotEq => "!=".into(),
            Token::Gt => ">".into(),
            Token::Gte => ">=".into(),
            Token::Lt => "<".into(),
            Token::Lte => "<=".into(),
            Token::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        let start = pos;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(pos + 1).is_some_and(char::is_ascii_digit))
        {
            let (value, next) = lex_number(&chars, pos)?;
            tokens.push(Spanned {
                token: Token::Number(value),
                position: start,
            });
            pos = next;
            continue;
        }

        if c == '"' || c == '\'' {
            let (text, next) = lex_string(&chars, pos)?;
            tokens.push(Spanned {
                token: Token::Str(text),
                position: start,
            });
            pos = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(chars[start..pos].iter().collect()),
                position: start,
            });
            continue;
        }

        let next = chars.get(pos + 1).copied();
        let next2 = chars.get(pos + 2).copied();
        let (token, width) = match (c, next, next2) {
            ('=', Some('='), Some('=')) => (Token::EqEqEq, 3),
            ('!', Some('='), Some('=')) => (Token::NotEqEq, 3),
            ('=', Some('='), _) => (Token::EqEq, 2),
            ('!', Some('='), _) => (Token::NotEq, 2),
            ('>', Some('='), _) => (Token::Gte, 2),
            ('<', Some('='), _) => (Token::Lte, 2),
            ('&', Some('&'), _) => (Token::AndAnd, 2),
            ('|', Some('|'), _) => (Token::OrOr, 2),
            ('>', ..) => (Token::Gt, 1),
            ('<', ..) => (Token::Lt, 1),
            ('!', ..) => (Token::Bang, 1),
            ('(', ..) => (Token::LParen, 1),
            (')', ..) => (Token::RParen, 1),
            (',', ..) => (Token::Comma, 1),
            ('?', ..) => (Token::Question, 1),
            (':', ..) => (Token::Colon, 1),
            ('+', ..) => (Token::Plus, 1),
            ('-', ..) => (Token::Minus, 1),
            ('*', ..) => (Token::Star, 1),
            ('/', ..) => (Token::Slash, 1),
            ('%', ..) => (Token::Percent, 1),
            (ch, ..) => {
                return Err(FormulaError::UnexpectedCharacter {
                    ch,
                    position: start,
                });
            }
        };
        tokens.push(Spanned {
            token,
            position: start,
        });
        pos += width;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        position: chars.len(),
    });
    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), FormulaError> {
    let mut pos = start;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < chars.len() && chars[pos] == '.' {
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    // Exponent only counts when digits follow it.
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut ahead = pos + 1;
        if ahead < chars.len() && matches!(chars[ahead], '+' | '-') {
            ahead += 1;
        }
        if ahead < chars.len() && chars[ahead].is_ascii_digit() {
            pos = ahead;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    if pos < chars.len() && (chars[pos].is_alphabetic() || chars[pos] == '_') {
        return Err(FormulaError::UnexpectedCharacter {
            ch: chars[pos],
            position: pos,
        });
    }

    let text: String = chars[start..pos].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| FormulaError::UnexpectedToken {
            found: text.clone(),
            position: start,
        })?;
    Ok((value, pos))
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), FormulaError> {
    let quote = chars[start];
    let mut pos = start + 1;
    let mut text = String::new();
    while pos < chars.len() {
        match chars[pos] {
            c if c == quote => return Ok((text, pos + 1)),
            '\\' if pos + 1 < chars.len() => {
                text.push(match chars[pos + 1] {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                pos += 2;
            }
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }
    Err(FormulaError::UnterminatedString { position: start })
}
