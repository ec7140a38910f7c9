//! Tolerant Java tokenizer.
//!
//! Produces just enough structure for declaration-level parsing: identifiers,
//! literals, Javadoc blocks, and single-character punctuation. Ordinary
//! comments are dropped. Unterminated literals and comments run to the end of
//! the input instead of failing.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Char(String),
    Number(String),
    /// Body of a `/** ... */` block, without the delimiters.
    Doc(String),
    /// Single punctuation character; `>>` is two `>` tokens.
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub(crate) fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub(crate) fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(w) if w == word)
    }

    pub(crate) fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(w) => Some(w),
            _ => None,
        }
    }

    /// Approximate source text, used when echoing unparsed expressions.
    pub(crate) fn text(&self) -> String {
        match &self.kind {
            TokenKind::Ident(s) | TokenKind::Number(s) => s.clone(),
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::Char(s) => format!("'{s}'"),
            TokenKind::Doc(_) => String::new(),
            TokenKind::Punct(c) => c.to_string(),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    tokens: Vec<Token>,
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        line: 1,
        tokens: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, line: usize) {
        self.tokens.push(Token { kind, line });
    }

    fn run(&mut self) {
        while let Some(&c) = self.chars.peek() {
            let line = self.line;
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' => {
                    self.bump();
                    match self.chars.peek() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            self.bump();
                            self.block_comment(line);
                        }
                        _ => self.push(TokenKind::Punct('/'), line),
                    }
                }
                '"' => {
                    self.bump();
                    let text = self.string_literal();
                    self.push(TokenKind::Str(text), line);
                }
                '\'' => {
                    self.bump();
                    let text = self.quoted('\'');
                    self.push(TokenKind::Char(text), line);
                }
                c if c.is_ascii_digit() => {
                    let number = self.number();
                    self.push(TokenKind::Number(number), line);
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let mut word = String::new();
                    while let Some(&c) = self.chars.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '$' {
                            word.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    self.push(TokenKind::Ident(word), line);
                }
                other => {
                    self.bump();
                    self.push(TokenKind::Punct(other), line);
                }
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Called after `/*` has been consumed.
    fn block_comment(&mut self, line: usize) {
        // `/**/` is an empty ordinary comment, not Javadoc.
        let is_doc = self.chars.peek() == Some(&'*') && {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            lookahead.peek() != Some(&'/')
        };
        if is_doc {
            self.bump();
        }

        let mut body = String::new();
        while let Some(c) = self.bump() {
            if c == '*' && self.chars.peek() == Some(&'/') {
                self.bump();
                break;
            }
            body.push(c);
        }

        if is_doc {
            self.push(TokenKind::Doc(body), line);
        }
    }

    /// Called after the opening `"`. Handles text blocks as well.
    fn string_literal(&mut self) -> String {
        let mut lookahead = self.chars.clone();
        if lookahead.next() == Some('"') && lookahead.next() == Some('"') {
            self.bump();
            self.bump();
            return self.text_block();
        }
        if self.chars.peek() == Some(&'"') {
            // Empty literal `""`.
            self.bump();
            return String::new();
        }
        self.quoted('"')
    }

    fn text_block(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.bump() {
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    text.push(unescape(escaped));
                }
                continue;
            }
            if c == '"' {
                let mut lookahead = self.chars.clone();
                if lookahead.next() == Some('"') && lookahead.next() == Some('"') {
                    self.bump();
                    self.bump();
                    break;
                }
            }
            text.push(c);
        }
        text.trim().to_string()
    }

    fn quoted(&mut self, close: char) -> String {
        let mut text = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    if let Some(escaped) = self.bump() {
                        text.push(unescape(escaped));
                    }
                }
                c if c == close => break,
                '\n' => break,
                c => text.push(c),
            }
        }
        text
    }

    fn number(&mut self) -> String {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && text.ends_with(['e', 'E'])
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }
}

const fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}
