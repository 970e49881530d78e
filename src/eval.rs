//! Total expression and condition evaluation
//!
//! `eval_expr` never fails: recognized forms evaluate against the live
//! variable table with C-like precedence, and anything else degrades to
//! integer zero (when the text looks numeric) or to the raw text itself.
//! `eval_cond` splits one infix comparison and falls back to a truthiness
//! test of the whole expression.

use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::state::VarValue;
use crate::store::VarTable;
use crate::value::{Ref, Value};

/// Evaluate an expression against the current variables. Total.
pub fn eval_expr(text: &str, vars: &VarTable) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Int(0);
    }
    let tokens = Lexer::tokenize(trimmed);
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        vars,
    };
    match parser.ternary() {
        Ok(value) if parser.at_end() => value,
        _ => fallback(trimmed),
    }
}

/// Evaluate a condition: one infix comparison, or truthiness of the whole text.
pub fn eval_cond(text: &str, vars: &VarTable) -> bool {
    let trimmed = text.trim();
    for op in ["==", "!=", "<=", ">=", "<", ">"] {
        if let Some((lhs, rhs)) = split_comparison(trimmed, op) {
            let left = eval_expr(lhs, vars);
            let right = eval_expr(rhs, vars);
            return compare(op, &left, &right);
        }
    }
    eval_expr(trimmed, vars).is_truthy()
}

/// Value equality as the engine defines it: among pointer-shaped values only
/// the null pointer compares equal to itself; address tokens are opaque.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Addr(_), _) | (_, Value::Addr(_)) => false,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => match (a.as_num(), b.as_num()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn compare(op: &str, left: &Value, right: &Value) -> bool {
    match op {
        "==" => values_equal(left, right),
        "!=" => !values_equal(left, right),
        _ => match (left.as_num(), right.as_num()) {
            (Some(a), Some(b)) => match op {
                "<=" => a <= b,
                ">=" => a >= b,
                "<" => a < b,
                _ => a > b,
            },
            _ => false,
        },
    }
}

fn fallback(text: &str) -> Value {
    if numeric_looking(text) {
        Value::Int(0)
    } else {
        Value::Str(text.to_string())
    }
}

fn numeric_looking(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || " _+-*/().".contains(c))
}

/// Find `op` at paren depth zero, outside literals, with neighbors that rule
/// out being part of a longer operator (`<=`, `->`, shifts).
fn split_comparison<'t>(text: &'t str, op: &str) -> Option<(&'t str, &'t str)> {
    let bytes = text.as_bytes();
    let needle = op.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_char = false;
    let mut i = 0;

    while i + needle.len() <= bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        if in_char {
            match b {
                b'\\' => i += 1,
                b'\'' => in_char = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'\'' => in_char = true,
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            _ => {}
        }
        if depth == 0 && &bytes[i..i + needle.len()] == needle {
            let prev = if i > 0 { bytes[i - 1] } else { 0 };
            let next = bytes.get(i + needle.len()).copied().unwrap_or(0);
            let standalone = match op {
                "<" | ">" => {
                    next != b'=' && prev != b'<' && prev != b'>' && !(op == ">" && prev == b'-')
                }
                "==" => prev != b'!' && prev != b'<' && prev != b'>' && next != b'=',
                _ => true,
            };
            if standalone {
                let lhs = text[..i].trim();
                let rhs = text[i + needle.len()..].trim();
                if !lhs.is_empty() && !rhs.is_empty() {
                    return Some((lhs, rhs));
                }
            }
        }
        i += 1;
    }
    None
}

/// Recursive-descent evaluator over tokens. `Err(())` means the form is not
/// in the grammar; callers fall back rather than propagate.
struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    vars: &'a VarTable,
}

impl<'a> ExprParser<'a> {
    fn kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        self.kind() == &TokenKind::Eof
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(())
        }
    }

    fn ident(&mut self) -> Result<String, ()> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(()),
        }
    }

    fn ternary(&mut self) -> Result<Value, ()> {
        let cond = self.addsub()?;
        if self.eat(&TokenKind::Question) {
            let then = self.ternary()?;
            self.expect(&TokenKind::Colon)?;
            let other = self.ternary()?;
            Ok(if cond.is_truthy() { then } else { other })
        } else {
            Ok(cond)
        }
    }

    fn addsub(&mut self) -> Result<Value, ()> {
        let mut value = self.muldiv()?;
        loop {
            if self.eat(&TokenKind::Plus) {
                value = arith('+', &value, &self.muldiv()?);
            } else if self.eat(&TokenKind::Minus) {
                value = arith('-', &value, &self.muldiv()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn muldiv(&mut self) -> Result<Value, ()> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&TokenKind::Star) {
                value = arith('*', &value, &self.unary()?);
            } else if self.eat(&TokenKind::Slash) {
                value = arith('/', &value, &self.unary()?);
            } else if self.eat(&TokenKind::Percent) {
                value = arith('%', &value, &self.unary()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<Value, ()> {
        if self.eat(&TokenKind::Minus) {
            return Ok(match self.primary()? {
                Value::Int(i) => Value::Int(-i),
                Value::Float(f) => Value::Float(-f),
                other => Value::Int(-other.as_int().unwrap_or(0)),
            });
        }
        if self.eat(&TokenKind::Plus) {
            return self.primary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, ()> {
        match self.kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Value::Int(n))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Value::Float(f))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Value::Str(s))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Value::Char(c))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Value::Bool(b))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            TokenKind::LParen => {
                self.advance();
                let value = self.ternary()?;
                self.expect(&TokenKind::RParen)?;
                Ok(value)
            }
            TokenKind::Amp => {
                self.advance();
                let name = self.ident()?;
                Ok(Value::Addr(Ref::Var(name)))
            }
            TokenKind::Star => {
                self.advance();
                let name = self.ident()?;
                Ok(match self.vars.get(&name).and_then(|v| v.points_to.clone()) {
                    Some(target) => Value::Addr(target),
                    None => Value::Int(0),
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                if name == "sizeof" {
                    return self.sizeof_form();
                }
                if self.kind() == &TokenKind::LParen {
                    return self.call(&name);
                }
                if self.eat(&TokenKind::LBracket) {
                    let index = self.ternary()?;
                    self.expect(&TokenKind::RBracket)?;
                    return Ok(self.index_value(&name, &index));
                }
                Ok(self.variable_value(&name))
            }
            _ => Err(()),
        }
    }

    fn variable_value(&self, name: &str) -> Value {
        match self.vars.get(name) {
            Some(var) => match &var.value {
                VarValue::Scalar(v) => v.clone(),
                VarValue::Array(_) => Value::Int(0),
            },
            None => Value::Int(0),
        }
    }

    fn index_value(&self, name: &str, index: &Value) -> Value {
        let idx = index.as_int().unwrap_or(0);
        if idx < 0 {
            return Value::Int(0);
        }
        match self.vars.get(name) {
            Some(var) => match &var.value {
                VarValue::Array(values) => {
                    values.get(idx as usize).cloned().unwrap_or(Value::Int(0))
                }
                _ => Value::Int(0),
            },
            None => Value::Int(0),
        }
    }

    fn call(&mut self, name: &str) -> Result<Value, ()> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.ternary()?);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(&TokenKind::RParen)?;
                break;
            }
        }
        Ok(builtin(name, args))
    }

    /// `sizeof(x)` with the optional combined form `sizeof(arr)/sizeof(arr[0])`.
    fn sizeof_form(&mut self) -> Result<Value, ()> {
        self.expect(&TokenKind::LParen)?;
        let first = self.ident()?;
        let first_indexed = self.eat_index()?;
        self.expect(&TokenKind::RParen)?;

        if !first_indexed
            && self.kind() == &TokenKind::Slash
            && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind),
                        Some(TokenKind::Ident(n)) if n == "sizeof")
        {
            let save = self.pos;
            self.advance(); // '/'
            self.advance(); // 'sizeof'
            if self.divisor_sizeof(&first).is_none() {
                self.pos = save;
            } else {
                return Ok(Value::Int(self.divided_sizeof(&first)));
            }
        }

        Ok(Value::Int(self.size_of_operand(&first, first_indexed)))
    }

    /// Parse the `(arr[0])` part of the combined form; `None` rewinds.
    fn divisor_sizeof(&mut self, first: &str) -> Option<()> {
        if self.expect(&TokenKind::LParen).is_err() {
            return None;
        }
        let second = self.ident().ok()?;
        let indexed = self.eat_index().ok()?;
        if self.expect(&TokenKind::RParen).is_err() {
            return None;
        }
        if indexed && second == *first {
            Some(())
        } else {
            None
        }
    }

    fn divided_sizeof(&self, name: &str) -> i64 {
        match self.vars.get(name) {
            Some(var) => match &var.value {
                VarValue::Array(values) => values.len() as i64,
                _ => 1,
            },
            None => 1,
        }
    }

    fn eat_index(&mut self) -> Result<bool, ()> {
        if !self.eat(&TokenKind::LBracket) {
            return Ok(false);
        }
        if !self.eat(&TokenKind::RBracket) {
            self.ternary()?;
            self.expect(&TokenKind::RBracket)?;
        }
        Ok(true)
    }

    fn size_of_operand(&self, name: &str, indexed: bool) -> i64 {
        if let Some(var) = self.vars.get(name) {
            return match &var.value {
                VarValue::Array(values) if !indexed => values.len() as i64 * 4,
                VarValue::Array(_) => 4,
                _ => size_of_type(base_type(&var.ty)),
            };
        }
        size_of_type(name)
    }
}

/// `sizeof` for a type name; unknown types count as 4.
fn size_of_type(name: &str) -> i64 {
    match name {
        "char" | "bool" => 1,
        "short" => 2,
        "int" | "float" => 4,
        "long" | "double" => 8,
        _ => 4,
    }
}

/// Element type of a declared type string (`int[5]` -> `int`, `Node*` -> `Node`).
pub fn base_type(ty: &str) -> &str {
    let end = ty.find(['[', '*']).unwrap_or(ty.len());
    ty[..end].trim()
}

fn arith(op: char, left: &Value, right: &Value) -> Value {
    let float = matches!(left, Value::Float(_)) || matches!(right, Value::Float(_));
    if float {
        let a = left.as_float().unwrap_or(0.0);
        let b = right.as_float().unwrap_or(0.0);
        return match op {
            '+' => Value::Float(a + b),
            '-' => Value::Float(a - b),
            '*' => Value::Float(a * b),
            '/' if b == 0.0 => Value::Int(0),
            '/' => Value::Float(a / b),
            _ if b == 0.0 => Value::Int(0),
            _ => Value::Float(a % b),
        };
    }
    let a = left.as_int().unwrap_or(0);
    let b = right.as_int().unwrap_or(0);
    match op {
        '+' => Value::Int(a.wrapping_add(b)),
        '-' => Value::Int(a.wrapping_sub(b)),
        '*' => Value::Int(a.wrapping_mul(b)),
        '/' if b == 0 => Value::Int(0),
        '/' => Value::Int(a.wrapping_div(b)),
        _ if b == 0 => Value::Int(0),
        _ => Value::Int(a.wrapping_rem(b)),
    }
}

fn builtin(name: &str, mut args: Vec<Value>) -> Value {
    match name {
        "abs" => match args.first() {
            Some(Value::Int(i)) => Value::Int(i.wrapping_abs()),
            Some(Value::Float(f)) => Value::Float(f.abs()),
            _ => Value::Int(0),
        },
        "min" | "max" => {
            let a = args.first().cloned().unwrap_or(Value::Int(0));
            let b = args.get(1).cloned().unwrap_or(Value::Int(0));
            let (x, y) = (a.as_num().unwrap_or(0.0), b.as_num().unwrap_or(0.0));
            let pick_a = if name == "min" { x <= y } else { x >= y };
            if pick_a {
                a
            } else {
                b
            }
        }
        "sqrt" => {
            let x = args.first().and_then(Value::as_num).unwrap_or(0.0);
            let root = x.sqrt();
            if root.is_nan() {
                Value::Int(0)
            } else {
                Value::Float(root)
            }
        }
        "pow" => {
            let base = args.first().and_then(Value::as_num).unwrap_or(0.0);
            let exp = args.get(1).and_then(Value::as_num).unwrap_or(0.0);
            Value::Float(base.powf(exp))
        }
        // unknown functions pass their first argument through
        _ => {
            if args.is_empty() {
                Value::Int(0)
            } else {
                args.swap_remove(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Variable;
    use crate::value::HeapId;

    fn vars() -> VarTable {
        let mut table = VarTable::new();
        table.insert(Variable::primitive("x", "int", Value::Int(3)));
        table.insert(Variable::primitive("y", "int", Value::Int(3)));
        table.insert(Variable::primitive("i", "int", Value::Int(4)));
        table.insert(Variable::array(
            "arr",
            "int[5]",
            vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Int(4),
                Value::Int(5),
            ],
        ));
        table.insert(Variable::pointer(
            "p",
            "Node*",
            Some(Ref::Heap(HeapId(0))),
        ));
        table.insert(Variable::pointer("q", "Node*", None));
        table
    }

    fn eval(text: &str) -> Value {
        eval_expr(text, &vars())
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), Value::Int(14));
        assert_eq!(eval("(2+3)*4"), Value::Int(20));
        assert_eq!(eval("10%3"), Value::Int(1));
        assert_eq!(eval("7/2"), Value::Int(3));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("5/0"), Value::Int(0));
        assert_eq!(eval("5%0"), Value::Int(0));
        assert_eq!(eval("5.0/0"), Value::Int(0));
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("0x10"), Value::Int(16));
        assert_eq!(eval("'a'"), Value::Char('a'));
        assert_eq!(eval("true"), Value::Bool(true));
        assert_eq!(eval("nullptr"), Value::Null);
        assert_eq!(eval("NULL"), Value::Null);
        assert_eq!(eval("3.5"), Value::Float(3.5));
        assert_eq!(eval("\"hi\""), Value::Str("hi".to_string()));
        assert_eq!(eval("-7"), Value::Int(-7));
    }

    #[test]
    fn test_variables_and_indexing() {
        assert_eq!(eval("x"), Value::Int(3));
        assert_eq!(eval("x + y"), Value::Int(6));
        assert_eq!(eval("arr[2]"), Value::Int(3));
        assert_eq!(eval("arr[i]"), Value::Int(5));
        assert_eq!(eval("arr[99]"), Value::Int(0));
        assert_eq!(eval("unknown"), Value::Int(0));
    }

    #[test]
    fn test_address_and_deref() {
        assert_eq!(eval("&x"), Value::Addr(Ref::Var("x".to_string())));
        assert_eq!(eval("*p"), Value::Addr(Ref::Heap(HeapId(0))));
        assert_eq!(eval("*q"), Value::Int(0));
        assert_eq!(eval("*unknown"), Value::Int(0));
    }

    #[test]
    fn test_sizeof() {
        assert_eq!(eval("sizeof(int)"), Value::Int(4));
        assert_eq!(eval("sizeof(char)"), Value::Int(1));
        assert_eq!(eval("sizeof(double)"), Value::Int(8));
        assert_eq!(eval("sizeof(arr)"), Value::Int(20));
        assert_eq!(eval("sizeof(arr)/sizeof(arr[0])"), Value::Int(5));
        assert_eq!(eval("sizeof(x)"), Value::Int(4));
    }

    #[test]
    fn test_builtins() {
        assert_eq!(eval("abs(-5)"), Value::Int(5));
        assert_eq!(eval("min(3, 9)"), Value::Int(3));
        assert_eq!(eval("max(3, 9)"), Value::Int(9));
        assert_eq!(eval("pow(2, 3)"), Value::Float(8.0));
        assert_eq!(eval("mystery(42)"), Value::Int(42));
        assert_eq!(eval("mystery()"), Value::Int(0));
    }

    #[test]
    fn test_ternary() {
        assert_eq!(eval("1 ? 10 : 20"), Value::Int(10));
        assert_eq!(eval("0 ? 10 : 20"), Value::Int(20));
        assert_eq!(eval("x - 3 ? 10 : 20"), Value::Int(20));
    }

    #[test]
    fn test_fallback_forms() {
        // numeric-looking garbage degrades to zero
        assert_eq!(eval("x y z"), Value::Int(0));
        // non-numeric characters keep the raw text
        assert_eq!(
            eval("p->data"),
            Value::Str("p->data".to_string())
        );
    }

    #[test]
    fn test_eval_cond() {
        let table = vars();
        assert!(eval_cond("i % 2 == 0", &table));
        assert!(!eval_cond("i % 2 == 1", &table));
        assert!(eval_cond("x <= y", &table));
        assert!(eval_cond("x == y", &table));
        assert!(!eval_cond("x < y", &table));
        assert!(eval_cond("arr[0] < arr[1]", &table));
        assert!(eval_cond("x", &table));
        assert!(!eval_cond("0", &table));
    }

    #[test]
    fn test_pointer_conditions() {
        let table = vars();
        assert!(eval_cond("q == nullptr", &table));
        assert!(eval_cond("p != nullptr", &table));
        assert!(!eval_cond("p == nullptr", &table));
        // address tokens are opaque; even identical ones are not equal
        assert!(!eval_cond("p == p", &table));
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&Value::Null, &Value::Null));
        assert!(values_equal(&Value::Int(2), &Value::Float(2.0)));
        assert!(!values_equal(
            &Value::Addr(Ref::Heap(HeapId(1))),
            &Value::Addr(Ref::Heap(HeapId(1)))
        ));
        assert!(!values_equal(&Value::Addr(Ref::Heap(HeapId(1))), &Value::Null));
    }
}
