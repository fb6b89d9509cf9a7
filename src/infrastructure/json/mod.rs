// ============================================================
// JSON INFRASTRUCTURE
// ============================================================
// Fallback-driven JSON ingestion and records-oriented export

mod json_resolver;
mod json_writer;
mod table_builder;

pub use json_resolver::{
    Attempt, AttemptLog, Decline, GenericValueStrategy, JsonResolver, JsonStrategy,
    LineDelimitedStrategy, RecordsStrategy,
};
pub use json_writer::JsonWriter;
pub use table_builder::JsonTableBuilder;
