//! Statement application
//!
//! Applies one recognized `Statement` to the variable table and heap.
//! Returns the human-readable action description when the program state
//! observably changed, `None` otherwise: dropped writes (out-of-range
//! indices, unknown targets) are silent by contract.

use crate::eval::{base_type, eval_expr};
use crate::parser::Statement;
use crate::state::{VarValue, Variable};
use crate::store::{Heap, VarTable};
use crate::value::{Ref, Value, VisualKind};

/// Field names that always render as pointers on heap objects.
const POINTER_FIELDS: [&str; 2] = ["next", "prev"];

/// Apply a statement; `Some(action)` means a snapshot-worthy change.
pub fn apply(stmt: &Statement, vars: &mut VarTable, heap: &mut Heap) -> Option<String> {
    match stmt {
        Statement::PrimitiveDecl { ty, name, init } => {
            let value = coerce(ty, eval_expr(init, vars));
            let action = format!("Created {} = {}", name, value);
            vars.insert(Variable::primitive(name.clone(), ty.clone(), value));
            Some(action)
        }

        Statement::ArrayDecl { ty, name, init } => {
            let values: Vec<Value> = init
                .iter()
                .map(|expr| coerce(ty, eval_expr(expr, vars)))
                .collect();
            let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let action = format!("Created array {} = [{}]", name, rendered.join(", "));
            let decl_ty = format!("{}[{}]", ty, values.len());
            vars.insert(Variable::array(name.clone(), decl_ty, values));
            Some(action)
        }

        Statement::ArrayElemAssign { name, index, expr } => {
            let value = coerce(
                base_type(&vars.get(name)?.ty),
                eval_expr(expr, vars),
            );
            let var = vars.get_mut(name)?;
            let VarValue::Array(values) = &mut var.value else {
                return None;
            };
            // writes outside [0, len) are dropped, never resized
            let slot = values.get_mut(*index)?;
            let old = slot.clone();
            *slot = value.clone();
            Some(format!("{}[{}] changed: {} → {}", name, index, old, value))
        }

        Statement::PointerDeclNew { ty, name, alloc_ty } => {
            let id = heap.alloc(alloc_ty);
            let decl_ty = format!("{}*", ty);
            vars.insert(Variable::pointer(
                name.clone(),
                decl_ty,
                Some(Ref::Heap(id)),
            ));
            Some(format!("Created {} = new {}()", name, alloc_ty))
        }

        Statement::PointerDeclAddr { ty, name, target } => {
            let points_to = if vars.contains(target) {
                Some(Ref::Var(target.clone()))
            } else {
                None
            };
            let decl_ty = format!("{}*", ty);
            vars.insert(Variable::pointer(name.clone(), decl_ty, points_to));
            Some(format!("Created {} = &{}", name, target))
        }

        Statement::PointerDeclNull { ty, name } => {
            let decl_ty = format!("{}*", ty);
            vars.insert(Variable::pointer(name.clone(), decl_ty, None));
            Some(format!("Created {} = nullptr", name))
        }

        Statement::FieldAssign { ptr, field, expr } => {
            let value = eval_expr(expr, vars);
            let target = match &vars.get(ptr)?.points_to {
                Some(Ref::Heap(id)) => *id,
                _ => return None,
            };
            let visual = if POINTER_FIELDS.contains(&field.as_str()) || value == Value::Null {
                VisualKind::Pointer
            } else {
                VisualKind::Primitive
            };
            let object = heap.get_mut(target)?;
            object.set_field(field, value.clone(), visual);
            Some(format!("Set {}->{} = {}", ptr, field, value))
        }

        Statement::FieldCopy { name, src, field } => {
            let source = match &vars.get(src)?.points_to {
                Some(Ref::Heap(id)) => *id,
                _ => return None,
            };
            let slot = heap.get(source)?.field(field)?;
            let points_to = match &slot.value {
                Value::Addr(r) => Some(r.clone()),
                Value::Null => None,
                _ => return None,
            };
            let var = vars.get_mut(name)?;
            var.value = VarValue::Scalar(match &points_to {
                Some(r) => Value::Addr(r.clone()),
                None => Value::Null,
            });
            var.points_to = points_to;
            Some(format!("{} = {}->{}", name, src, field))
        }

        Statement::Reassign { name, expr } => {
            let var = vars.get(name)?;
            match var.visual {
                VisualKind::Array => None,
                VisualKind::Pointer => {
                    let value = eval_expr(expr, vars);
                    let points_to = match &value {
                        Value::Addr(r) => Some(r.clone()),
                        Value::Null => None,
                        _ => return None,
                    };
                    let var = vars.get_mut(name)?;
                    let old = scalar(&var.value);
                    var.points_to = points_to.clone();
                    let new = match points_to {
                        Some(r) => Value::Addr(r),
                        None => Value::Null,
                    };
                    var.value = VarValue::Scalar(new.clone());
                    Some(format!("{} changed: {} → {}", name, old, new))
                }
                VisualKind::Primitive => {
                    let value = coerce(base_type(&var.ty), eval_expr(expr, vars));
                    let var = vars.get_mut(name)?;
                    let old = scalar(&var.value);
                    var.value = VarValue::Scalar(value.clone());
                    Some(format!("{} changed: {} → {}", name, old, value))
                }
            }
        }

        Statement::IncDec { name, delta } => {
            let var = vars.get_mut(name)?;
            let VarValue::Scalar(current) = &var.value else {
                return None;
            };
            let old = current.as_int().ok()?;
            let new = Value::Int(old + delta);
            var.value = VarValue::Scalar(new.clone());
            Some(format!("{} changed: {} → {}", name, old, new))
        }

        Statement::CompoundAssign { name, op, expr } => {
            let operand = eval_expr(expr, vars).as_int().unwrap_or(0);
            let var = vars.get_mut(name)?;
            let VarValue::Scalar(current) = &var.value else {
                return None;
            };
            let old = current.as_int().ok()?;
            let new = match *op {
                '+' => old.wrapping_add(operand),
                '-' => old.wrapping_sub(operand),
                '*' => old.wrapping_mul(operand),
                // integer division throughout, zero divisor yields zero
                _ if operand == 0 => 0,
                _ => old.wrapping_div(operand),
            };
            let new = Value::Int(new);
            var.value = VarValue::Scalar(new.clone());
            Some(format!("{} changed: {} → {}", name, old, new))
        }

        Statement::Swap { name, i, j } => {
            let var = vars.get_mut(name)?;
            let VarValue::Array(values) = &mut var.value else {
                return None;
            };
            if *i >= values.len() || *j >= values.len() {
                return None;
            }
            values.swap(*i, *j);
            Some(format!("Swapped {}[{}] and {}[{}]", name, i, name, j))
        }
    }
}

fn scalar(value: &VarValue) -> Value {
    match value {
        VarValue::Scalar(v) => v.clone(),
        VarValue::Array(_) => Value::Int(0),
    }
}

/// Nudge an evaluated value toward its declared type.
fn coerce(ty: &str, value: Value) -> Value {
    match ty {
        "int" | "long" | "short" => Value::Int(value.as_int().unwrap_or(0)),
        "float" | "double" => Value::Float(value.as_float().unwrap_or(0.0)),
        "bool" => Value::Bool(value.is_truthy()),
        "char" => match value {
            Value::Char(_) => value,
            Value::Int(i) => char::from_u32(i as u32)
                .map(Value::Char)
                .unwrap_or(Value::Int(i)),
            other => other,
        },
        _ => value,
    }
}
