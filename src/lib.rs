//! steptrace: educational C/C++ execution-trace engine
//!
//! Given a snippet of C++-like source, the engine produces an ordered list
//! of program states (call stack, named variables, simulated heap) that a
//! front-end renders as stepwise animations. It is a symbolic
//! mini-interpreter, not a debugger: a restricted statement catalogue is
//! recognized line by line, loops are unrolled against the current state,
//! and one deep-copied snapshot is emitted per observable change.
//!
//! # Architecture
//!
//! - **Lexer + statement recognizer** (`parser`): tokens and the fixed
//!   statement catalogue, tried in priority order
//! - **Evaluators** (`eval`): total expression and condition evaluation
//!   against the live variable table
//! - **Flow simulation** (`flow`): statement-unit splitting, loop
//!   discovery, iteration counting, induction substitution
//! - **Trace driver** (`tracer`): the three-pass algorithm emitting
//!   `State` snapshots
//! - **Session façade** (`session`): start / step-forward / step-backward /
//!   get-state / end over stored traces
//! - **Validator** (`validator`): the native compiler as a syntactic gate
//!
//! # Example
//!
//! ```
//! use steptrace::{trace, Limits};
//!
//! let states = trace("int main(){ int x=10; int y=x+5; }", &Limits::default());
//! assert_eq!(states.len(), 2);
//! assert_eq!(states[1].action.as_deref(), Some("Created y = 15"));
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod exec;
pub mod flow;
pub mod parser;
pub mod session;
pub mod state;
pub mod store;
pub mod tracer;
pub mod validator;
pub mod value;

pub use config::{EngineConfig, Limits, ValidatorConfig};
pub use error::EngineError;
pub use session::{Language, Session, SessionRegistry, StartOutput, StepOutput};
pub use state::{FieldSlot, HeapObject, StackFrame, State, VarValue, Variable};
pub use store::{Heap, VarTable};
pub use tracer::trace;
pub use validator::{NoValidation, ToolchainValidator, Validate};
pub use value::{HeapId, Ref, Value, VisualKind};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_trace_to_json_schema() {
        let states = trace(
            "struct Node{int data; Node* next;};\nint main(){ Node* head=new Node(); head->data=7; head->next=nullptr; }",
            &Limits::default(),
        );
        let json = serde_json::to_value(&states).unwrap();
        let last = &json[states.len() - 1];

        assert_eq!(last["currentLine"], 2);
        assert_eq!(last["heap"][0]["id"], "heap_0");
        assert_eq!(last["heap"][0]["address"], "heap_0");
        assert_eq!(last["heap"][0]["fields"][0]["name"], "data");
        assert_eq!(last["heap"][0]["fields"][1]["value"], "nullptr");
        assert_eq!(last["variables"][0]["pointsTo"], "heap_0");
        assert_eq!(last["stackFrames"][0]["functionName"], "main");
    }

    #[test]
    fn test_session_round_trip() {
        let registry = SessionRegistry::with_validator(Box::new(NoValidation), Limits::default());
        let out = registry
            .start("int main(){ int a=1; int b=2; }", Language::Cpp)
            .unwrap();
        assert_eq!(out.total_steps, 2);

        let forward = registry.step_forward(out.session_id).unwrap();
        assert!(forward.at_end);
        let back = registry.step_backward(out.session_id).unwrap();
        assert!(back.at_start);

        registry.end(out.session_id).unwrap();
        assert!(registry.step_forward(out.session_id).is_err());
    }
}
