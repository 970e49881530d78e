//! Statement recognizer for the supported C++ subset
//!
//! A fixed catalogue of statement shapes, tried in a documented priority
//! order. Recognition is pure: it classifies one statement's text into a
//! `Statement` and leaves all mutation to the executor. Anything that does
//! not match a shape is simply not a statement as far as the engine is
//! concerned.

use super::lexer::{Lexer, Token, TokenKind};

/// Declared types that introduce a primitive or array variable.
pub const PRIMITIVE_TYPES: [&str; 7] = ["int", "float", "double", "char", "bool", "long", "short"];

/// A recognized statement shape.
///
/// Expression operands are kept as source text; the evaluator consumes them
/// lazily against the live variable table.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `T name = expr;`
    PrimitiveDecl { ty: String, name: String, init: String },

    /// `T name[N] = {v1, v2, ...};` where the initializer decides the length
    ArrayDecl { ty: String, name: String, init: Vec<String> },

    /// `name[k] = expr;` with a literal index
    ArrayElemAssign { name: String, index: usize, expr: String },

    /// `T* name = new U();`
    PointerDeclNew { ty: String, name: String, alloc_ty: String },

    /// `T* name = &var;`
    PointerDeclAddr { ty: String, name: String, target: String },

    /// `T* name = nullptr;`
    PointerDeclNull { ty: String, name: String },

    /// `ptr->field = expr;`
    FieldAssign { ptr: String, field: String, expr: String },

    /// `name = src->field;`
    FieldCopy { name: String, src: String, field: String },

    /// `name = expr;`
    Reassign { name: String, expr: String },

    /// `++name`, `name++`, `--name`, `name--`
    IncDec { name: String, delta: i64 },

    /// `name op= expr;` with `op` one of `+ - * /`
    CompoundAssign { name: String, op: char, expr: String },

    /// `swap(a[i], a[j]);` with literal indices into one array
    Swap { name: String, i: usize, j: usize },
}

/// Strip an end-of-line comment and trailing semicolons.
pub fn strip_line(line: &str) -> String {
    let mut cut = line.len();
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut in_char = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\\' if in_string || in_char => {
                i += 1; // skip the escaped byte
            }
            b'"' if !in_char => in_string = !in_string,
            b'\'' if !in_string => in_char = !in_char,
            b'/' if !in_string && !in_char && i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                cut = i;
                break;
            }
            _ => {}
        }
        i += 1;
    }

    let mut text = line[..cut].trim();
    while let Some(stripped) = text.strip_suffix(';') {
        text = stripped.trim_end();
    }
    text.to_string()
}

/// Lines that never mutate state through the statement catalogue.
///
/// Loops and branches are structural here too; the simulator handles them
/// separately.
pub fn is_structural(line: &str) -> bool {
    let text = line.trim();
    if text.is_empty() {
        return true;
    }
    match text.as_bytes()[0] {
        b'#' | b'{' | b'}' => return true,
        _ => {}
    }
    // function signatures
    if text.contains("main(") || text.contains("main (") {
        return true;
    }
    let first_word: String = text
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    matches!(
        first_word.as_str(),
        "return" | "cout" | "cin" | "std" | "printf" | "scanf" | "for" | "while" | "if" | "else"
            | "struct" | "class" | "using" | "namespace" | "break" | "continue" | "delete" | "void"
    )
}

/// Try each catalogue shape in priority order; `None` means the line is not
/// a recognized statement.
pub fn recognize(line: &str) -> Option<Statement> {
    let text = strip_line(line);
    if text.is_empty() {
        return None;
    }
    let tokens = Lexer::tokenize(&text);
    let cur = Cursor::new(&tokens, &text);

    match cur.kind(0) {
        TokenKind::PlusPlus | TokenKind::MinusMinus => {
            let delta = if cur.kind(0) == &TokenKind::PlusPlus { 1 } else { -1 };
            let name = cur.ident(1)?;
            cur.expect_end(2)?;
            Some(Statement::IncDec {
                name: name.to_string(),
                delta,
            })
        }
        TokenKind::Ident(word) => {
            if cur.kind(1) == &TokenKind::Star {
                return recognize_pointer_decl(&cur, word);
            }
            if PRIMITIVE_TYPES.contains(&word.as_str()) {
                if let TokenKind::Ident(name) = cur.kind(1) {
                    return recognize_decl(&cur, word, name);
                }
            }
            if word == "swap" && cur.kind(1) == &TokenKind::LParen {
                return recognize_swap(&cur);
            }
            recognize_ident_statement(&cur, word)
        }
        _ => None,
    }
}

fn recognize_pointer_decl(cur: &Cursor<'_>, ty: &str) -> Option<Statement> {
    // Ident '*' Ident '=' ...
    let name = cur.ident(2)?;
    if cur.kind(3) != &TokenKind::Eq {
        return None;
    }
    match cur.kind(4) {
        TokenKind::Ident(word) if word == "new" => {
            let alloc_ty = cur.ident(5)?;
            let mut next = 6;
            if cur.kind(next) == &TokenKind::LParen && cur.kind(next + 1) == &TokenKind::RParen {
                next += 2;
            }
            cur.expect_end(next)?;
            Some(Statement::PointerDeclNew {
                ty: ty.to_string(),
                name: name.to_string(),
                alloc_ty: alloc_ty.to_string(),
            })
        }
        TokenKind::Amp => {
            let target = cur.ident(5)?;
            cur.expect_end(6)?;
            Some(Statement::PointerDeclAddr {
                ty: ty.to_string(),
                name: name.to_string(),
                target: target.to_string(),
            })
        }
        TokenKind::Null => {
            cur.expect_end(5)?;
            Some(Statement::PointerDeclNull {
                ty: ty.to_string(),
                name: name.to_string(),
            })
        }
        _ => None,
    }
}

fn recognize_decl(cur: &Cursor<'_>, ty: &str, name: &str) -> Option<Statement> {
    match cur.kind(2) {
        TokenKind::Eq => Some(Statement::PrimitiveDecl {
            ty: ty.to_string(),
            name: name.to_string(),
            init: cur.text_from(3)?,
        }),
        TokenKind::LBracket => {
            // T name [ N? ] = { ... }
            let mut next = 3;
            if matches!(cur.kind(next), TokenKind::Int(_)) {
                next += 1; // declared length is ignored
            }
            if cur.kind(next) != &TokenKind::RBracket {
                return None;
            }
            if cur.kind(next + 1) != &TokenKind::Eq {
                return None;
            }
            if cur.kind(next + 2) != &TokenKind::LBrace {
                return None;
            }
            let open = cur.token(next + 2)?;
            let close = cur.last_of(&TokenKind::RBrace)?;
            if close.start <= open.end {
                return None;
            }
            let inner = &cur.source[open.end..close.start];
            Some(Statement::ArrayDecl {
                ty: ty.to_string(),
                name: name.to_string(),
                init: split_top_level(inner),
            })
        }
        _ => None,
    }
}

fn recognize_swap(cur: &Cursor<'_>) -> Option<Statement> {
    // swap ( a [ i ] , a [ j ] )
    let a = cur.ident(2)?;
    let i = cur.int(4).filter(|_| cur.kind(3) == &TokenKind::LBracket)?;
    if cur.kind(5) != &TokenKind::RBracket || cur.kind(6) != &TokenKind::Comma {
        return None;
    }
    let b = cur.ident(7)?;
    let j = cur.int(9).filter(|_| cur.kind(8) == &TokenKind::LBracket)?;
    if cur.kind(10) != &TokenKind::RBracket || cur.kind(11) != &TokenKind::RParen {
        return None;
    }
    cur.expect_end(12)?;
    if a != b || i < 0 || j < 0 {
        return None;
    }
    Some(Statement::Swap {
        name: a.to_string(),
        i: i as usize,
        j: j as usize,
    })
}

fn recognize_ident_statement(cur: &Cursor<'_>, name: &str) -> Option<Statement> {
    match cur.kind(1) {
        TokenKind::LBracket => {
            // name [ k ] = expr, literal indices only
            let index = cur.int(2)?;
            if index < 0 || cur.kind(3) != &TokenKind::RBracket || cur.kind(4) != &TokenKind::Eq {
                return None;
            }
            Some(Statement::ArrayElemAssign {
                name: name.to_string(),
                index: index as usize,
                expr: cur.text_from(5)?,
            })
        }
        TokenKind::Arrow => {
            let field = cur.ident(2)?;
            if cur.kind(3) != &TokenKind::Eq {
                return None;
            }
            Some(Statement::FieldAssign {
                ptr: name.to_string(),
                field: field.to_string(),
                expr: cur.text_from(4)?,
            })
        }
        TokenKind::Eq => {
            // `name = src->field` takes priority over a plain reassignment
            if let (Some(src), TokenKind::Arrow, Some(field)) =
                (cur.ident(2), cur.kind(3), cur.ident(4))
            {
                if cur.kind(5) == &TokenKind::Eof {
                    return Some(Statement::FieldCopy {
                        name: name.to_string(),
                        src: src.to_string(),
                        field: field.to_string(),
                    });
                }
            }
            Some(Statement::Reassign {
                name: name.to_string(),
                expr: cur.text_from(2)?,
            })
        }
        TokenKind::PlusPlus | TokenKind::MinusMinus => {
            let delta = if cur.kind(1) == &TokenKind::PlusPlus { 1 } else { -1 };
            cur.expect_end(2)?;
            Some(Statement::IncDec {
                name: name.to_string(),
                delta,
            })
        }
        TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq => {
            let op = match cur.kind(1) {
                TokenKind::PlusEq => '+',
                TokenKind::MinusEq => '-',
                TokenKind::StarEq => '*',
                _ => '/',
            };
            Some(Statement::CompoundAssign {
                name: name.to_string(),
                op,
                expr: cur.text_from(2)?,
            })
        }
        _ => None,
    }
}

/// Split initializer text on top-level commas.
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(text[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Read-only token cursor over one statement.
struct Cursor<'a> {
    tokens: &'a [Token],
    source: &'a str,
    eof: TokenKind,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Cursor {
            tokens,
            source,
            eof: TokenKind::Eof,
        }
    }

    fn token(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    fn kind(&self, i: usize) -> &TokenKind {
        self.tokens.get(i).map(|t| &t.kind).unwrap_or(&self.eof)
    }

    fn ident(&self, i: usize) -> Option<&str> {
        match self.kind(i) {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }

    fn int(&self, i: usize) -> Option<i64> {
        match self.kind(i) {
            TokenKind::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The raw source text from token `i` to the end; `None` when empty.
    fn text_from(&self, i: usize) -> Option<String> {
        let token = self.token(i)?;
        if token.kind == TokenKind::Eof {
            return None;
        }
        let text = self.source[token.start..].trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    fn expect_end(&self, i: usize) -> Option<()> {
        if self.kind(i) == &TokenKind::Eof {
            Some(())
        } else {
            None
        }
    }

    fn last_of(&self, kind: &TokenKind) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| &t.kind == kind)
    }
}
