//! Snapshot data model and its JSON wire schema
//!
//! Everything the front-end renders lives here: variables, heap objects,
//! stack frames, and the per-step `State` record. The JSON field names are
//! part of the external contract and must not drift.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::value::{HeapId, Ref, Value, VisualKind};

/// Payload of a variable: a single scalar or a fixed-length array.
///
/// Array length is fixed at declaration; element writes never resize it.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Scalar(Value),
    Array(Vec<Value>),
}

impl Serialize for VarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VarValue::Scalar(v) => v.serialize(serializer),
            VarValue::Array(vs) => vs.serialize(serializer),
        }
    }
}

/// A named variable in the single simulated `main` frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Source name, unique within the frame.
    pub name: String,

    /// Declared type string, e.g. `int`, `int[5]`, `Node*`.
    pub ty: String,

    /// Current value (scalar or array elements).
    pub value: VarValue,

    /// Rendering tag for the front-end.
    pub visual: VisualKind,

    /// Pointer target, when this variable is a pointer. `None` means null.
    pub points_to: Option<Ref>,
}

impl Variable {
    /// Stable wire identifier, derived from the name.
    pub fn id(&self) -> String {
        format!("var_{}", self.name)
    }

    pub fn primitive(name: impl Into<String>, ty: impl Into<String>, value: Value) -> Self {
        Variable {
            name: name.into(),
            ty: ty.into(),
            value: VarValue::Scalar(value),
            visual: VisualKind::Primitive,
            points_to: None,
        }
    }

    pub fn array(name: impl Into<String>, ty: impl Into<String>, values: Vec<Value>) -> Self {
        Variable {
            name: name.into(),
            ty: ty.into(),
            value: VarValue::Array(values),
            visual: VisualKind::Array,
            points_to: None,
        }
    }

    /// A pointer variable; its scalar value mirrors the target token.
    pub fn pointer(name: impl Into<String>, ty: impl Into<String>, points_to: Option<Ref>) -> Self {
        let value = match &points_to {
            Some(r) => Value::Addr(r.clone()),
            None => Value::Null,
        };
        Variable {
            name: name.into(),
            ty: ty.into(),
            value: VarValue::Scalar(value),
            visual: VisualKind::Pointer,
            points_to,
        }
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let is_pointer = self.visual == VisualKind::Pointer;
        let len = if is_pointer { 6 } else { 5 };
        let mut s = serializer.serialize_struct("Variable", len)?;
        s.serialize_field("id", &self.id())?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("type", &self.ty)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("visualType", &self.visual)?;
        if is_pointer {
            s.serialize_field("pointsTo", &self.points_to.as_ref().map(Ref::token))?;
        }
        s.end()
    }
}

/// One field of a heap object.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub name: String,
    pub value: Value,
    pub visual: VisualKind,
}

impl Serialize for FieldSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FieldSlot", 3)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("visualType", &self.visual)?;
        s.end()
    }
}

/// A dynamically allocated aggregate, created by `new T()` and never freed.
///
/// Fields appear in assignment order; `p->f = e` updates an existing slot or
/// appends a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapObject {
    pub id: HeapId,
    pub ty: String,
    pub fields: Vec<FieldSlot>,
}

impl HeapObject {
    pub fn new(id: HeapId, ty: impl Into<String>) -> Self {
        HeapObject {
            id,
            ty: ty.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Update an existing field or append a new one.
    pub fn set_field(&mut self, name: &str, value: Value, visual: VisualKind) {
        if let Some(slot) = self.fields.iter_mut().find(|f| f.name == name) {
            slot.value = value;
            slot.visual = visual;
        } else {
            self.fields.push(FieldSlot {
                name: name.to_string(),
                value,
                visual,
            });
        }
    }
}

impl Serialize for HeapObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HeapObject", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &self.ty)?;
        // The simulated address is the id itself.
        s.serialize_field("address", &self.id)?;
        s.serialize_field("fields", &self.fields)?;
        s.end()
    }
}

/// One call-stack frame. The engine simulates a single `main` frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub id: String,
    pub function_name: String,
    pub line: usize,
    pub variables: Vec<Variable>,
}

/// A frozen observation of stack and heap at one source position.
///
/// Snapshots are deep copies: mutating the engine after emission must not
/// perturb any already-emitted state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Position in the trace; `states[k].step == k`.
    pub step: usize,

    /// 1-based source line.
    pub current_line: usize,

    /// The trimmed source text of the statement that produced this state.
    pub source_code: String,

    /// Short human-readable description of what changed.
    pub action: Option<String>,

    pub variables: Vec<Variable>,
    pub stack_frames: Vec<StackFrame>,
    pub heap: Vec<HeapObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_json_names() {
        let var = Variable::primitive("x", "int", Value::Int(10));
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["id"], "var_x");
        assert_eq!(json["name"], "x");
        assert_eq!(json["type"], "int");
        assert_eq!(json["value"], 10);
        assert_eq!(json["visualType"], "primitive");
        assert!(json.get("pointsTo").is_none());
    }

    #[test]
    fn test_pointer_json_points_to() {
        let var = Variable::pointer("p", "Node*", Some(Ref::Heap(HeapId(2))));
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["visualType"], "pointer");
        assert_eq!(json["value"], "heap_2");
        assert_eq!(json["pointsTo"], "heap_2");

        let null = Variable::pointer("q", "Node*", None);
        let json = serde_json::to_value(&null).unwrap();
        assert_eq!(json["value"], "nullptr");
        assert!(json["pointsTo"].is_null());
    }

    #[test]
    fn test_heap_object_address_mirrors_id() {
        let mut obj = HeapObject::new(HeapId(0), "Node");
        obj.set_field("data", Value::Int(10), VisualKind::Primitive);
        obj.set_field("next", Value::Null, VisualKind::Pointer);

        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["id"], "heap_0");
        assert_eq!(json["address"], "heap_0");
        assert_eq!(json["type"], "Node");
        assert_eq!(json["fields"][0]["name"], "data");
        assert_eq!(json["fields"][1]["visualType"], "pointer");
    }

    #[test]
    fn test_set_field_updates_in_place() {
        let mut obj = HeapObject::new(HeapId(0), "Node");
        obj.set_field("data", Value::Int(1), VisualKind::Primitive);
        obj.set_field("data", Value::Int(2), VisualKind::Primitive);
        assert_eq!(obj.fields.len(), 1);
        assert_eq!(obj.field("data").unwrap().value, Value::Int(2));
    }

    #[test]
    fn test_state_json_names() {
        let state = State {
            step: 0,
            current_line: 1,
            source_code: "int x = 1;".to_string(),
            action: Some("Created x = 1".to_string()),
            variables: vec![],
            stack_frames: vec![StackFrame {
                id: "frame_0".to_string(),
                function_name: "main".to_string(),
                line: 1,
                variables: vec![],
            }],
            heap: vec![],
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["step"], 0);
        assert_eq!(json["currentLine"], 1);
        assert_eq!(json["sourceCode"], "int x = 1;");
        assert_eq!(json["stackFrames"][0]["functionName"], "main");
        assert!(json["heap"].as_array().unwrap().is_empty());
    }
}
