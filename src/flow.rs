//! Source normalization and control-flow simulation support
//!
//! The engine works over *units*: one statement, `{`, or `}` each, carrying
//! the 1-based physical line it started on. Splitting happens up front so a
//! whole program on one line and the same program spread over many lines
//! trace identically. `for(…;…;…)` semicolons and array-initializer braces
//! never split a unit.
//!
//! Loop discovery, `for`-header parsing, the iteration-count table, and
//! induction-variable substitution live here as well.

use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::PRIMITIVE_TYPES;
use crate::state::VarValue;
use crate::store::VarTable;

/// One logical statement (or brace) with its physical source line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub line: usize,
    pub text: String,
}

/// Split source text into units. Comments and preprocessor lines are dropped.
pub fn split_units(source: &str) -> Vec<SourceUnit> {
    fn flush(units: &mut Vec<SourceUnit>, buf: &mut String, buf_line: usize) {
        let text = buf.trim();
        if !text.is_empty() {
            units.push(SourceUnit {
                line: buf_line,
                text: text.to_string(),
            });
        }
        buf.clear();
    }

    let mut units = Vec::new();
    let mut buf = String::new();
    let mut buf_line = 1usize;
    let mut line = 1usize;
    let mut paren_depth = 0i32;
    let mut init_depth = 0i32;
    let mut saw_eq = false;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                line += 1;
                if !buf.is_empty() {
                    buf.push(' ');
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\n' {
                        line += 1;
                    } else if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            '#' if buf.trim().is_empty() => {
                buf.clear();
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' | '\'' => {
                if buf.trim().is_empty() {
                    buf_line = line;
                }
                buf.push(ch);
                while let Some(c) = chars.next() {
                    buf.push(c);
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            buf.push(escaped);
                        }
                    } else if c == ch {
                        break;
                    } else if c == '\n' {
                        line += 1;
                    }
                }
            }
            ';' if paren_depth == 0 && init_depth == 0 => {
                if !buf.trim().is_empty() {
                    buf.push(';');
                    flush(&mut units, &mut buf, buf_line);
                }
                saw_eq = false;
            }
            '{' => {
                if init_depth > 0 || (saw_eq && paren_depth == 0) {
                    init_depth += 1;
                    buf.push('{');
                } else {
                    flush(&mut units, &mut buf, buf_line);
                    saw_eq = false;
                    units.push(SourceUnit {
                        line,
                        text: "{".to_string(),
                    });
                }
            }
            '}' => {
                if init_depth > 0 {
                    init_depth -= 1;
                    buf.push('}');
                } else {
                    flush(&mut units, &mut buf, buf_line);
                    saw_eq = false;
                    units.push(SourceUnit {
                        line,
                        text: "}".to_string(),
                    });
                }
            }
            '(' => {
                if buf.trim().is_empty() {
                    buf_line = line;
                }
                paren_depth += 1;
                buf.push('(');
            }
            ')' => {
                paren_depth -= 1;
                buf.push(')');
            }
            '=' => {
                if buf.trim().is_empty() {
                    buf_line = line;
                }
                if paren_depth == 0 {
                    saw_eq = true;
                }
                buf.push('=');
            }
            _ => {
                if !ch.is_whitespace() && buf.trim().is_empty() {
                    buf_line = line;
                }
                buf.push(ch);
            }
        }
    }
    flush(&mut units, &mut buf, buf_line);
    units
}

/// Locate the body of `main`: unit indices `(start, end)` with `end` at the
/// closing brace (exclusive as a range).
pub fn main_body(units: &[SourceUnit]) -> Option<(usize, usize)> {
    let sig = units
        .iter()
        .position(|u| u.text.contains("main(") || u.text.contains("main ("))?;
    if units.get(sig + 1)?.text != "{" {
        return None;
    }
    let mut depth = 1i32;
    for i in (sig + 2)..units.len() {
        match units[i].text.as_str() {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return Some((sig + 2, i));
                }
            }
            _ => {}
        }
    }
    Some((sig + 2, units.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    For,
    While,
}

/// A discovered loop: header unit, body range, and the closing-brace unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopBlock {
    pub header: usize,
    pub body_start: usize,
    pub end: usize,
    pub kind: LoopKind,
}

/// Scan a unit range for loop headers and match their closing braces.
pub fn discover_loops(units: &[SourceUnit], start: usize, end: usize) -> Vec<LoopBlock> {
    let mut blocks = Vec::new();
    for i in start..end.min(units.len()) {
        if let Some(kind) = loop_kind(&units[i].text) {
            if units.get(i + 1).map(|u| u.text.as_str()) == Some("{") {
                if let Some(close) = matching_close(units, i + 1, end) {
                    blocks.push(LoopBlock {
                        header: i,
                        body_start: i + 2,
                        end: close,
                        kind,
                    });
                }
            }
        }
    }
    blocks
}

/// Index of the `}` matching the `{` at `open`.
pub fn matching_close(units: &[SourceUnit], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, unit) in units.iter().enumerate().take(end.min(units.len())).skip(open) {
        match unit.text.as_str() {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn keyword_prefix(text: &str, keyword: &str) -> bool {
    text.starts_with(keyword)
        && !text[keyword.len()..]
            .chars()
            .next()
            .map(|c| c.is_alphanumeric() || c == '_')
            .unwrap_or(false)
}

pub fn loop_kind(text: &str) -> Option<LoopKind> {
    if keyword_prefix(text, "for") {
        Some(LoopKind::For)
    } else if keyword_prefix(text, "while") {
        Some(LoopKind::While)
    } else {
        None
    }
}

/// Extract the condition text of an `if (cond)` header.
pub fn if_condition(text: &str) -> Option<String> {
    if !keyword_prefix(text, "if") {
        return None;
    }
    let open = text.find('(')?;
    let mut depth = 0i32;
    for (i, c) in text.char_indices().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[open + 1..i].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// A loop bound: decimal literal or identifier, resolved at loop entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Lit(i64),
    Name(String),
}

/// Late-bound resolution against the live variable map; unknowns are zero.
pub fn resolve(bound: &Bound, vars: &VarTable) -> i64 {
    match bound {
        Bound::Lit(n) => *n,
        Bound::Name(name) => vars
            .get(name)
            .and_then(|v| match &v.value {
                VarValue::Scalar(value) => value.as_int().ok(),
                VarValue::Array(_) => None,
            })
            .unwrap_or(0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
}

/// Parsed `for` header: `for (T? v = S; v OP E; v++|v--|v+=k|v-=k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForHeader {
    pub var: String,
    pub init: Bound,
    pub cmp: CmpOp,
    pub limit: Bound,
    /// Signed per-iteration delta of the induction variable.
    pub step: i64,
}

/// Iteration count from the bound table, clamped to `[0, max]`.
///
/// The step magnitude is deliberately not consulted; the table depends only
/// on the comparison operator.
pub fn iteration_count(start: i64, end: i64, cmp: CmpOp, max: u32) -> u32 {
    let n = match cmp {
        CmpOp::Lt => end - start,
        CmpOp::Le => end - start + 1,
        CmpOp::Gt => start - end,
        CmpOp::Ge => start - end + 1,
        CmpOp::Ne => (end - start).abs(),
    };
    n.clamp(0, max as i64) as u32
}

/// Parse a `for` header unit; `None` when it is not in the supported shape.
pub fn parse_for_header(text: &str) -> Option<ForHeader> {
    let tokens = Lexer::tokenize(text);
    let mut cur = TokCur {
        tokens: &tokens,
        pos: 0,
    };

    match cur.kind() {
        TokenKind::Ident(word) if word == "for" => cur.bump(),
        _ => return None,
    }
    if !cur.eat(&TokenKind::LParen) {
        return None;
    }

    // optional declared type on the induction variable
    if let TokenKind::Ident(word) = cur.kind() {
        if PRIMITIVE_TYPES.contains(&word.as_str())
            && matches!(cur.peek(), TokenKind::Ident(_))
        {
            cur.bump();
        }
    }

    let var = cur.ident()?;
    if !cur.eat(&TokenKind::Eq) {
        return None;
    }
    let init = cur.bound()?;
    if !cur.eat(&TokenKind::Semi) {
        return None;
    }

    if cur.ident()? != var {
        return None;
    }
    let cmp = match cur.kind() {
        TokenKind::Lt => CmpOp::Lt,
        TokenKind::Le => CmpOp::Le,
        TokenKind::Gt => CmpOp::Gt,
        TokenKind::Ge => CmpOp::Ge,
        TokenKind::NotEq => CmpOp::Ne,
        _ => return None,
    };
    cur.bump();
    let limit = cur.bound()?;
    if !cur.eat(&TokenKind::Semi) {
        return None;
    }

    let step = cur.step(&var)?;
    if !cur.eat(&TokenKind::RParen) {
        return None;
    }

    Some(ForHeader {
        var,
        init,
        cmp,
        limit,
        step,
    })
}

/// Replace standalone occurrences of `name` (and so `[name]`) with `value`.
/// Identifier runs and literals are respected; this is textual substitution,
/// not renaming.
pub fn substitute_ident(text: &str, name: &str, value: i64) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    let mut in_string = false;
    let mut in_char = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string || in_char {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if (in_string && ch == '"') || (in_char && ch == '\'') {
                in_string = false;
                in_char = false;
            }
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            run.push(ch);
            continue;
        }
        if !run.is_empty() {
            if run == name {
                out.push_str(&value.to_string());
            } else {
                out.push_str(&run);
            }
            run.clear();
        }
        if ch == '"' {
            in_string = true;
        } else if ch == '\'' {
            in_char = true;
        }
        out.push(ch);
    }
    if !run.is_empty() {
        if run == name {
            out.push_str(&value.to_string());
        } else {
            out.push_str(&run);
        }
    }
    out
}

/// Minimal token walker for header parsing.
struct TokCur<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokCur<'a> {
    fn kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn int(&mut self) -> Option<i64> {
        match self.kind() {
            TokenKind::Int(n) => {
                let n = *n;
                self.bump();
                Some(n)
            }
            _ => None,
        }
    }

    fn bound(&mut self) -> Option<Bound> {
        if self.eat(&TokenKind::Minus) {
            return self.int().map(|n| Bound::Lit(-n));
        }
        if let Some(n) = self.int() {
            return Some(Bound::Lit(n));
        }
        self.ident().map(Bound::Name)
    }

    /// `v++`, `++v`, `v--`, `--v`, `v += k`, `v -= k`
    fn step(&mut self, var: &str) -> Option<i64> {
        match self.kind() {
            TokenKind::PlusPlus => {
                self.bump();
                (self.ident()? == var).then_some(1)
            }
            TokenKind::MinusMinus => {
                self.bump();
                (self.ident()? == var).then_some(-1)
            }
            TokenKind::Ident(_) => {
                if self.ident()? != var {
                    return None;
                }
                match self.kind() {
                    TokenKind::PlusPlus => {
                        self.bump();
                        Some(1)
                    }
                    TokenKind::MinusMinus => {
                        self.bump();
                        Some(-1)
                    }
                    TokenKind::PlusEq => {
                        self.bump();
                        self.int()
                    }
                    TokenKind::MinusEq => {
                        self.bump();
                        self.int().map(|k| -k)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
