use std::fmt;

use serde::ser::{Serialize, Serializer};

/// Identifier of a simulated heap object.
///
/// Ids are dense and allocation-ordered; the wire form (`heap_<n>`) doubles
/// as the object's "address" in the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(pub u32);

impl HeapId {
    /// Wire token for this id, e.g. `heap_0`.
    pub fn token(&self) -> String {
        format!("heap_{}", self.0)
    }
}

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heap_{}", self.0)
    }
}

impl Serialize for HeapId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

/// Target of a pointer: a named stack variable or a heap object.
///
/// Keeping the two arms in one type means `points_to` is never a bare,
/// ambiguous string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    /// Address of a named variable (`&x`).
    Var(String),

    /// A heap object produced by `new T()`.
    Heap(HeapId),
}

impl Ref {
    /// Wire token for this reference: `&x` for variables, `heap_<n>` for objects.
    pub fn token(&self) -> String {
        match self {
            Ref::Var(name) => format!("&{}", name),
            Ref::Heap(id) => id.token(),
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// UI-side rendering tag, distinct from the declared C++ type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Primitive,
    Array,
    Pointer,
}

impl VisualKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualKind::Primitive => "primitive",
            VisualKind::Array => "array",
            VisualKind::Pointer => "pointer",
        }
    }
}

impl Serialize for VisualKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Runtime value in the trace engine.
///
/// Values are primitives plus two pointer-shaped forms: an opaque address
/// token and the null pointer. There is no aggregate variant; arrays live on
/// the owning `Variable` and object fields on the owning `HeapObject`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point number
    Float(f64),

    /// Boolean value
    Bool(bool),

    /// Character literal
    Char(char),

    /// UTF-8 string
    Str(String),

    /// Opaque address token (`&x` or a heap id)
    Addr(Ref),

    /// `nullptr` / `NULL`
    Null,
}

impl Value {
    /// Check if this value is truthy (for boolean coercion in conditions).
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::Str(s) => !s.is_empty(),
            Value::Addr(_) => true,
            Value::Null => false,
        }
    }

    /// Try to extract an integer from this value.
    pub fn as_int(&self) -> Result<i64, String> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i64),
            Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
            Value::Char(c) => Ok(*c as i64),
            _ => Err(format!("Cannot convert {:?} to int", self)),
        }
    }

    /// Try to extract a float from this value.
    pub fn as_float(&self) -> Result<f64, String> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Char(c) => Ok(*c as i64 as f64),
            _ => Err(format!("Cannot convert {:?} to float", self)),
        }
    }

    /// Numeric view of this value, if it has one.
    pub fn as_num(&self) -> Option<f64> {
        self.as_float().ok()
    }

    /// Get the type name of this value for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Addr(_) => "address",
            Value::Null => "nullptr",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Addr(r) => write!(f, "{}", r),
            Value::Null => write!(f, "nullptr"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_str(&c.to_string()),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Addr(r) => serializer.serialize_str(&r.token()),
            // The front-end accepts either JSON null or the literal string;
            // the string keeps value columns uniformly renderable.
            Value::Null => serializer.serialize_str("nullptr"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Float(1.5).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Str("hello".to_string()).is_truthy());
        assert!(!Value::Str("".to_string()).is_truthy());
        assert!(Value::Addr(Ref::Heap(HeapId(0))).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_conversions() {
        let v = Value::Int(42);
        assert_eq!(v.as_int().unwrap(), 42);
        assert_eq!(v.as_float().unwrap(), 42.0);

        let v = Value::Char('a');
        assert_eq!(v.as_int().unwrap(), 97);

        assert!(Value::Null.as_int().is_err());
        assert!(Value::Str("x".to_string()).as_num().is_none());
    }

    #[test]
    fn test_display_tokens() {
        assert_eq!(Value::Null.to_string(), "nullptr");
        assert_eq!(Value::Addr(Ref::Var("x".to_string())).to_string(), "&x");
        assert_eq!(Value::Addr(Ref::Heap(HeapId(3))).to_string(), "heap_3");
        assert_eq!(Value::Char('z').to_string(), "'z'");
    }

    #[test]
    fn test_json_forms() {
        assert_eq!(serde_json::to_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(serde_json::to_value(Value::Null).unwrap(), "nullptr");
        assert_eq!(
            serde_json::to_value(Value::Addr(Ref::Heap(HeapId(1)))).unwrap(),
            "heap_1"
        );
    }
}
