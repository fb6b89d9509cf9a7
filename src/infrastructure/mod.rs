pub mod config;

// Tabular codecs
pub mod csv;
pub mod excel;
pub mod json;
