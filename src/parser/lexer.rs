//! Token scanner for the supported C++ subset
//!
//! Converts one statement's text into a token stream. The scanner is total:
//! it never fails, and characters it does not understand become opaque
//! `Unknown` tokens that downstream recognizers simply decline to match.
//! Tokens carry byte offsets into the input so expression text can be
//! sliced back out verbatim.

use std::fmt;

/// Token kinds for the supported subset.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    CharLit(char),
    Bool(bool),
    Null,

    /// Identifier (including type keywords; the recognizer classifies them)
    Ident(String),

    // Arithmetic
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %

    // Increment / compound assignment
    PlusPlus,   // ++
    MinusMinus, // --
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Le,    // <=
    Ge,    // >=
    Lt,    // <
    Gt,    // >

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Not,    // !

    // Pointers / members
    Amp,   // &
    Arrow, // ->
    Dot,   // .

    // Assignment
    Eq, // =

    // Delimiters
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]

    // Punctuation
    Comma,    // ,
    Semi,     // ;
    Question, // ?
    Colon,    // :
    Hash,     // #

    /// Anything the scanner does not understand
    Unknown(char),

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "integer '{}'", n),
            TokenKind::Float(n) => write!(f, "float '{}'", n),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::CharLit(c) => write!(f, "char '{}'", c),
            TokenKind::Bool(b) => write!(f, "boolean '{}'", b),
            TokenKind::Null => write!(f, "'nullptr'"),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Unknown(c) => write!(f, "'{}'", c),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

impl TokenKind {
    fn text(&self) -> &'static str {
        match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Not => "!",
            TokenKind::Amp => "&",
            TokenKind::Arrow => "->",
            TokenKind::Dot => ".",
            TokenKind::Eq => "=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Hash => "#",
            _ => "",
        }
    }
}

/// A token with byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token { kind, start, end }
    }
}

/// The lexer walks one statement's text.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::Chars<'a>,
    current: Option<char>,
    offset: usize,
    token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Lexer {
            source,
            chars,
            current,
            offset: 0,
            token_start: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.token_start = self.offset;

        match self.current {
            None => self.make_token(TokenKind::Eof),
            Some(ch) => match ch {
                '(' => self.single_char_token(TokenKind::LParen),
                ')' => self.single_char_token(TokenKind::RParen),
                '{' => self.single_char_token(TokenKind::LBrace),
                '}' => self.single_char_token(TokenKind::RBrace),
                '[' => self.single_char_token(TokenKind::LBracket),
                ']' => self.single_char_token(TokenKind::RBracket),
                ',' => self.single_char_token(TokenKind::Comma),
                ';' => self.single_char_token(TokenKind::Semi),
                '?' => self.single_char_token(TokenKind::Question),
                ':' => self.single_char_token(TokenKind::Colon),
                '#' => self.single_char_token(TokenKind::Hash),
                '%' => self.single_char_token(TokenKind::Percent),
                '.' => self.single_char_token(TokenKind::Dot),

                '+' => {
                    self.advance();
                    match self.current {
                        Some('+') => {
                            self.advance();
                            self.make_token(TokenKind::PlusPlus)
                        }
                        Some('=') => {
                            self.advance();
                            self.make_token(TokenKind::PlusEq)
                        }
                        _ => self.make_token(TokenKind::Plus),
                    }
                }

                '-' => {
                    self.advance();
                    match self.current {
                        Some('-') => {
                            self.advance();
                            self.make_token(TokenKind::MinusMinus)
                        }
                        Some('=') => {
                            self.advance();
                            self.make_token(TokenKind::MinusEq)
                        }
                        Some('>') => {
                            self.advance();
                            self.make_token(TokenKind::Arrow)
                        }
                        _ => self.make_token(TokenKind::Minus),
                    }
                }

                '*' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::StarEq)
                    } else {
                        self.make_token(TokenKind::Star)
                    }
                }

                '/' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::SlashEq)
                    } else {
                        self.make_token(TokenKind::Slash)
                    }
                }

                '=' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::EqEq)
                    } else {
                        self.make_token(TokenKind::Eq)
                    }
                }

                '!' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::NotEq)
                    } else {
                        self.make_token(TokenKind::Not)
                    }
                }

                '<' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::Le)
                    } else {
                        self.make_token(TokenKind::Lt)
                    }
                }

                '>' => {
                    self.advance();
                    if self.current == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::Ge)
                    } else {
                        self.make_token(TokenKind::Gt)
                    }
                }

                '&' => {
                    self.advance();
                    if self.current == Some('&') {
                        self.advance();
                        self.make_token(TokenKind::AndAnd)
                    } else {
                        self.make_token(TokenKind::Amp)
                    }
                }

                '|' => {
                    self.advance();
                    if self.current == Some('|') {
                        self.advance();
                        self.make_token(TokenKind::OrOr)
                    } else {
                        self.make_token(TokenKind::Unknown('|'))
                    }
                }

                '"' => self.lex_string(),
                '\'' => self.lex_char(),
                '0'..='9' => self.lex_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident(),

                _ => {
                    self.advance();
                    self.make_token(TokenKind::Unknown(ch))
                }
            },
        }
    }

    /// Tokenize the whole input, including the trailing `Eof`.
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current {
            self.offset += ch.len_utf8();
        }
        self.current = self.chars.next();
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    while self.current.is_some() && self.current != Some('\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    self.advance();
                    while self.current.is_some() {
                        if self.current == Some('*') && self.peek() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.token_start, self.offset)
    }

    fn single_char_token(&mut self, kind: TokenKind) -> Token {
        self.advance();
        self.make_token(kind)
    }

    fn lex_string(&mut self) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        while self.current.is_some() && self.current != Some('"') {
            if self.current == Some('\\') {
                self.advance();
                match self.current {
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('0') => value.push('\0'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some(ch) => value.push(ch),
                    None => break,
                }
                self.advance();
            } else {
                value.push(self.current.unwrap());
                self.advance();
            }
        }

        if self.current == Some('"') {
            self.advance();
        }

        self.make_token(TokenKind::Str(value))
    }

    fn lex_char(&mut self) -> Token {
        self.advance(); // opening quote
        let ch = match self.current {
            Some('\\') => {
                self.advance();
                let escaped = match self.current {
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('0') => '\0',
                    Some(other) => other,
                    None => '\0',
                };
                self.advance();
                escaped
            }
            Some(other) => {
                self.advance();
                other
            }
            None => '\0',
        };

        // skip to the closing quote if the literal was malformed
        while self.current.is_some() && self.current != Some('\'') {
            self.advance();
        }
        if self.current == Some('\'') {
            self.advance();
        }

        self.make_token(TokenKind::CharLit(ch))
    }

    fn lex_number(&mut self) -> Token {
        // hex literal
        if self.current == Some('0') && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.current {
                if ch.is_ascii_hexdigit() {
                    digits.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let num = i64::from_str_radix(&digits, 16).unwrap_or(0);
            return self.make_token(TokenKind::Int(num));
        }

        let mut value = String::new();
        let mut is_float = false;

        while let Some('0'..='9') = self.current {
            value.push(self.current.unwrap());
            self.advance();
        }

        if self.current == Some('.') && matches!(self.peek(), Some('0'..='9')) {
            is_float = true;
            value.push('.');
            self.advance();
            while let Some('0'..='9') = self.current {
                value.push(self.current.unwrap());
                self.advance();
            }
        }

        // numeric suffixes (f, F, l, L, u, U) are consumed and ignored
        while let Some(ch) = self.current {
            match ch {
                'f' | 'F' => {
                    is_float = true;
                    self.advance();
                }
                'l' | 'L' | 'u' | 'U' => self.advance(),
                _ => break,
            }
        }

        if is_float {
            let num = value.parse::<f64>().unwrap_or(0.0);
            self.make_token(TokenKind::Float(num))
        } else {
            let num = value.parse::<i64>().unwrap_or(0);
            self.make_token(TokenKind::Int(num))
        }
    }

    fn lex_ident(&mut self) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current {
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match value.as_str() {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "nullptr" | "NULL" => TokenKind::Null,
            _ => TokenKind::Ident(value),
        };

        self.make_token(kind)
    }
}
