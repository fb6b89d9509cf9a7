pub mod conversion;
pub mod error;
pub mod formats;
pub mod table;
