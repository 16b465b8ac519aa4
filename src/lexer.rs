//! Character classification for the ArchScript reader.
//!
//! The lexer looks at exactly one character and reports its class. It never
//! advances: the parser decides how many characters a construct consumes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Apostrophe,
    Quote,
    Dot,
    Whitespace,
    Letter,
    Digit,
    Unknown,
    End,
}

/// Punctuation that may appear inside a symbol name besides letters.
const SYMBOL_CHARS: &[char] = &['_', '+', '-', '*', '/', '<', '>', '=', '!', '?', '@', '$', '%', '&', '^', '~'];

pub fn classify(source: &[char], pos: usize) -> Token {
    let Some(&c) = source.get(pos) else {
        return Token::End;
    };
    match c {
        '(' => Token::OpenParen,
        ')' => Token::CloseParen,
        '{' => Token::OpenBrace,
        '}' => Token::CloseBrace,
        '\'' => Token::Apostrophe,
        '"' => Token::Quote,
        '.' => Token::Dot,
        c if c.is_whitespace() => Token::Whitespace,
        c if c.is_ascii_digit() => Token::Digit,
        c if c.is_alphabetic() || SYMBOL_CHARS.contains(&c) => Token::Letter,
        _ => Token::Unknown,
    }
}

/// True when the character may continue a symbol lexeme.
pub fn continues_symbol(token: Token) -> bool {
    matches!(token, Token::Letter | Token::Digit | Token::Dot)
}

/// True when the character ends a numeric literal.
pub fn ends_number(token: Token) -> bool {
    matches!(
        token,
        Token::Whitespace | Token::OpenParen | Token::CloseParen | Token::OpenBrace | Token::CloseBrace | Token::End
    )
}
