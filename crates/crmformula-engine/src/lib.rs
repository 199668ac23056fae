//! crmformula_engine - Column formula evaluation for CRM table views.

pub mod builtins;
pub mod engine;
pub mod error;

pub use engine::{FormulaError, FormulaOutput, Row, Scalar, evaluate};
pub use error::EvalError;
