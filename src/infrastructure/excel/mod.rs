// ============================================================
// EXCEL INFRASTRUCTURE
// ============================================================
// xlsx reading (calamine) and writing (rust_xlsxwriter)

mod xlsx_reader;
mod xlsx_writer;

pub use xlsx_reader::XlsxReader;
pub use xlsx_writer::XlsxWriter;
