//! Table state and logic (UI-agnostic).

mod column;
mod eval;
mod state;

pub use column::{ColumnDef, ColumnKind, DisplayConfig, TableConfig};
pub use eval::RenderedTable;
pub use state::Table;
