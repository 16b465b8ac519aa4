//! Recursive-descent reader turning source text into [`Value`] forms.
//!
//! Dispatch is purely on the class of the next character. When input runs out
//! inside an open form the parser asks its [`Continuation`] for more text and
//! resumes where it stopped, which is how multi-line input reaches the REPL.

use crate::lexer::{classify, continues_symbol, ends_number, Token};
use crate::value::{StructMap, Value};

use super::error::LispError;

/// Supplies more text when a form is left open at the end of the input.
pub trait Continuation {
    /// `prompt` describes the partial form. `None` (or an empty string) means
    /// nothing more is available.
    fn more_input(&mut self, prompt: &str) -> Option<String>;
}

/// A collaborator that never has more input.
pub struct NoContinuation;

impl Continuation for NoContinuation {
    fn more_input(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

impl<F> Continuation for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn more_input(&mut self, prompt: &str) -> Option<String> {
        self(prompt)
    }
}

/// Deepest nesting of lists, expressions and structs a single form may have.
pub const MAX_NESTING: usize = 512;

pub struct Parser<'a> {
    source: Vec<char>,
    pos: usize,
    more: &'a mut dyn Continuation,
    exhausted: bool,
    depth: usize,
}

/// Parse every form in `source` with no continuation available.
pub fn parse(source: &str) -> Result<Vec<Value>, LispError> {
    let mut none = NoContinuation;
    Parser::new(source, &mut none).parse_all()
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, more: &'a mut dyn Continuation) -> Self {
        Self { source: source.chars().collect(), pos: 0, more, exhausted: false, depth: 0 }
    }

    /// The full buffer, including any continuation text appended so far.
    pub fn source(&self) -> String {
        self.source.iter().collect()
    }

    fn token(&self) -> Token {
        classify(&self.source, self.pos)
    }

    fn token_at(&self, pos: usize) -> Token {
        classify(&self.source, pos)
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn fragment(&self, begin: usize) -> String {
        let end = self.pos.min(self.source.len());
        self.source[begin.min(end)..end].iter().collect()
    }

    fn structural(&self, what: &str, begin: usize) -> LispError {
        LispError::structural(what, &self.fragment(begin), &self.source())
    }

    /// End of input inside the form opened at `begin`. The prompt is the whole
    /// partial source on one line. After one empty answer from the collaborator
    /// the next call reports `what` instead of asking.
    fn request_more(&mut self, what: &str, begin: usize) -> Result<(), LispError> {
        if self.exhausted {
            return Err(self.structural(what, begin));
        }
        let partial = self.source();
        let words: Vec<&str> = partial.split_whitespace().collect();
        let prompt = format!("{} ... ", words.join(" "));
        tracing::debug!(%prompt, "form left open, requesting more input");
        match self.more.more_input(&prompt) {
            Some(text) if !text.is_empty() => {
                self.source.push('\n');
                self.source.extend(text.chars());
            }
            _ => {
                self.source.push(' ');
                self.exhausted = true;
            }
        }
        Ok(())
    }

    /// Skip whitespace inside an open form, asking for more input at the end.
    fn skip_blank(&mut self, what: &str, begin: usize) -> Result<(), LispError> {
        loop {
            match self.token() {
                Token::Whitespace => self.pos += 1,
                Token::End => self.request_more(what, begin)?,
                _ => return Ok(()),
            }
        }
    }

    pub fn parse_all(&mut self) -> Result<Vec<Value>, LispError> {
        let mut forms = Vec::new();
        loop {
            while self.token() == Token::Whitespace {
                self.pos += 1;
            }
            if self.token() == Token::End {
                return Ok(forms);
            }
            forms.push(self.parse_one_form()?);
        }
    }

    pub fn parse_one_form(&mut self) -> Result<Value, LispError> {
        while self.token() == Token::Whitespace {
            self.pos += 1;
        }
        let begin = self.pos;
        match self.token() {
            Token::Digit => self.number(),
            Token::Letter => self.symbol(),
            Token::Quote => self.string(),
            Token::Apostrophe => self.quoted(),
            Token::OpenParen => self.nested(begin, Self::expression),
            Token::OpenBrace => self.nested(begin, Self::struct_literal),
            Token::End => Err(self.structural("unexpected end of input", begin)),
            Token::CloseParen => {
                self.pos += 1;
                Err(self.structural("unexpected close parenthesis", begin))
            }
            Token::CloseBrace => {
                self.pos += 1;
                Err(self.structural("unexpected close brace", begin))
            }
            Token::Whitespace | Token::Dot | Token::Unknown => {
                self.pos += 1;
                Err(self.structural("unexpected character", begin))
            }
        }
    }

    /// Parse one bracketed form, refusing to go deeper than [`MAX_NESTING`].
    fn nested(&mut self, begin: usize, form: fn(&mut Self) -> Result<Value, LispError>) -> Result<Value, LispError> {
        if self.depth >= MAX_NESTING {
            self.pos += 1;
            return Err(self.structural("nesting too deep", begin));
        }
        self.depth += 1;
        let result = form(self);
        self.depth -= 1;
        result
    }

    fn starts_negative_number(&self) -> bool {
        self.current() == Some('-') && self.token_at(self.pos + 1) == Token::Digit
    }

    /// Integer, or Double once a `.` shows up. A second `.` is malformed.
    fn number(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        if self.current() == Some('-') {
            self.pos += 1;
        }
        let mut seen_dot = false;
        loop {
            match self.token() {
                Token::Digit => self.pos += 1,
                Token::Dot if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                token if ends_number(token) => break,
                _ => {
                    self.pos += 1;
                    return Err(self.structural("invalid number format", begin));
                }
            }
        }
        let text = self.fragment(begin);
        let parsed = if seen_dot {
            text.parse::<f64>().ok().map(Value::Double)
        } else {
            text.parse::<i64>().ok().map(Value::Integer)
        };
        parsed.ok_or_else(|| self.structural("invalid number format", begin))
    }

    fn symbol(&mut self) -> Result<Value, LispError> {
        if self.starts_negative_number() {
            return self.number();
        }
        let begin = self.pos;
        while continues_symbol(self.token()) {
            self.pos += 1;
        }
        let name = self.fragment(begin);
        if name.eq_ignore_ascii_case("nil") {
            return Ok(Value::Nil);
        }
        if name.eq_ignore_ascii_case("true") {
            return Ok(Value::True);
        }
        if name.split('.').any(str::is_empty) {
            return Err(self.structural("invalid symbol path", begin));
        }
        Ok(Value::symbol(name))
    }

    fn string(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.current() {
                None => self.request_more("unterminated string", begin)?,
                Some('"') => {
                    self.pos += 1;
                    return Ok(Value::string(text));
                }
                Some('\\') => match self.source.get(self.pos + 1).copied() {
                    None => self.request_more("unterminated string", begin)?,
                    Some(escaped) => {
                        text.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                        self.pos += 2;
                    }
                },
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// `'` followed by a number, a bare word (read as a String) or a list.
    fn quoted(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        self.pos += 1;
        while self.token() == Token::End {
            self.request_more("bad literal", begin)?;
        }
        self.literal(begin)
    }

    fn literal(&mut self, begin: usize) -> Result<Value, LispError> {
        match self.token() {
            Token::Digit => self.number(),
            Token::Letter if self.starts_negative_number() => self.number(),
            Token::OpenParen => self.nested(begin, Self::literal_list),
            Token::Quote => self.string(),
            Token::Whitespace | Token::End | Token::OpenBrace | Token::CloseParen | Token::CloseBrace => {
                self.pos += 1;
                Err(self.structural("bad literal", begin))
            }
            _ => Ok(self.literal_word()),
        }
    }

    fn literal_word(&mut self) -> Value {
        let begin = self.pos;
        while !matches!(
            self.token(),
            Token::Whitespace | Token::OpenParen | Token::CloseParen | Token::OpenBrace | Token::CloseBrace | Token::End
        ) {
            self.pos += 1;
        }
        Value::string(self.fragment(begin))
    }

    fn literal_list(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_blank("mismatched open parenthesis", begin)?;
            match self.token() {
                Token::CloseParen => {
                    self.pos += 1;
                    return Ok(Value::list(items));
                }
                Token::CloseBrace => {
                    self.pos += 1;
                    return Err(self.structural("mismatched close brace", begin));
                }
                _ => {
                    let item_begin = self.pos;
                    items.push(self.literal(item_begin)?);
                }
            }
        }
    }

    fn expression(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_blank("mismatched open parenthesis", begin)?;
            match self.token() {
                Token::CloseParen => {
                    self.pos += 1;
                    if items.is_empty() {
                        return Ok(Value::Nil);
                    }
                    return Ok(Value::expression(items));
                }
                Token::CloseBrace => {
                    self.pos += 1;
                    return Err(self.structural("mismatched close brace", begin));
                }
                _ => items.push(self.parse_one_form()?),
            }
        }
    }

    fn struct_literal(&mut self) -> Result<Value, LispError> {
        let begin = self.pos;
        self.pos += 1;
        let mut fields = StructMap::new();
        loop {
            self.skip_blank("mismatched open brace", begin)?;
            match self.token() {
                Token::CloseBrace => {
                    self.pos += 1;
                    return Ok(Value::new_struct(fields));
                }
                Token::Letter => {
                    let key_begin = self.pos;
                    while matches!(self.token(), Token::Letter | Token::Digit) {
                        self.pos += 1;
                    }
                    let key = self.fragment(key_begin);
                    self.skip_blank("mismatched open brace", begin)?;
                    if self.current() != Some(':') {
                        return Err(self.structural("':' expected after struct key", begin));
                    }
                    self.pos += 1;
                    self.skip_blank("mismatched open brace", begin)?;
                    if self.token() == Token::CloseBrace {
                        return Err(self.structural("struct value expected", begin));
                    }
                    let value = self.parse_one_form()?;
                    fields.insert(key, value);
                }
                Token::CloseParen => {
                    self.pos += 1;
                    return Err(self.structural("mismatched close parenthesis", begin));
                }
                _ => {
                    self.pos += 1;
                    return Err(self.structural("struct key expected", begin));
                }
            }
        }
    }
}
