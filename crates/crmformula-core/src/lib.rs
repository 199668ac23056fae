//! crmformula-core - UI-agnostic table model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{ColumnDef, ColumnKind, DisplayConfig, RenderedTable, Table, TableConfig};
pub use error::{CrmError, Result};

pub use crmformula_engine::engine::{FormulaError, FormulaOutput, Row, Scalar};
