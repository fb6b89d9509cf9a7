// ============================================================
// CSV INFRASTRUCTURE
// ============================================================
// Comma-delimited text codec

mod csv_parser;
mod csv_writer;

pub use csv_parser::CsvParser;
pub use csv_writer::CsvWriter;
