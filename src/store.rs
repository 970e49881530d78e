//! Insertion-ordered stores for variables and heap objects
//!
//! Rendering is deterministic because both stores preserve insertion order:
//! the variable table is a slot vector with a name index, and the heap is a
//! dense pool addressed by `HeapId`.

use rustc_hash::FxHashMap;

use crate::state::{HeapObject, Variable};
use crate::value::HeapId;

/// Variable table for the single simulated `main` frame.
///
/// Re-inserting a name keeps its original position, so a re-declared
/// variable does not jump to the end of the rendered list.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    slots: Vec<Variable>,
    index: FxHashMap<String, usize>,
}

impl VarTable {
    pub fn new() -> Self {
        VarTable::default()
    }

    /// Insert or replace a variable, preserving slot order.
    pub fn insert(&mut self, var: Variable) {
        match self.index.get(&var.name) {
            Some(&slot) => self.slots[slot] = var,
            None => {
                self.index.insert(var.name.clone(), self.slots.len());
                self.slots.push(var);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&slot| &self.slots[slot])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let slot = *self.index.get(name)?;
        Some(&mut self.slots[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Deep copy of all variables, in insertion order.
    pub fn snapshot(&self) -> Vec<Variable> {
        self.slots.clone()
    }
}

/// The simulated heap: a dense, allocation-ordered object pool.
///
/// Objects are created exclusively by `new T()` and never freed; the model
/// ignores `delete`.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Allocate an object with an empty field list and return its id.
    pub fn alloc(&mut self, ty: &str) -> HeapId {
        let id = HeapId(self.objects.len() as u32);
        self.objects.push(HeapObject::new(id, ty));
        id
    }

    pub fn get(&self, id: HeapId) -> Option<&HeapObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: HeapId) -> Option<&mut HeapObject> {
        self.objects.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeapObject> {
        self.objects.iter()
    }

    /// Deep copy of all objects, in allocation order.
    pub fn snapshot(&self) -> Vec<HeapObject> {
        self.objects.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_var_table_order() {
        let mut vars = VarTable::new();
        vars.insert(Variable::primitive("b", "int", Value::Int(1)));
        vars.insert(Variable::primitive("a", "int", Value::Int(2)));
        vars.insert(Variable::primitive("c", "int", Value::Int(3)));

        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_var_table_reinsert_keeps_position() {
        let mut vars = VarTable::new();
        vars.insert(Variable::primitive("x", "int", Value::Int(1)));
        vars.insert(Variable::primitive("y", "int", Value::Int(2)));
        vars.insert(Variable::primitive("x", "int", Value::Int(9)));

        assert_eq!(vars.len(), 2);
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(
            vars.get("x").unwrap().value,
            crate::state::VarValue::Scalar(Value::Int(9))
        );
    }

    #[test]
    fn test_heap_alloc_order() {
        let mut heap = Heap::new();
        let a = heap.alloc("Node");
        let b = heap.alloc("Node");
        assert_eq!(a, HeapId(0));
        assert_eq!(b, HeapId(1));
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.get(a).unwrap().ty, "Node");
        assert!(heap.get(HeapId(9)).is_none());
    }
}
