// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Tabular structure, cell values and column type inference
// No I/O, no async

mod headers;
mod inference;
#[allow(clippy::module_inception)]
mod table;
mod value;

pub use headers::normalize_headers;
pub use inference::{TypeInference, DEFAULT_NA_TOKENS};
pub use table::{Column, Table};
pub use value::{format_float, ColumnType, Value, ValueKey};
