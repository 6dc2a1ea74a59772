//! Evaluator
//!
//! Runtime values, scopes and the interpreter that walks expression trees

pub mod interpreter;
pub mod scope;
pub mod value;

pub use interpreter::{evaluate, evaluate_filter};
pub use scope::{Scope, ScopeContext};
pub use value::{HostObject, RawString, Value};
