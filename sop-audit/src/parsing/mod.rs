//! CSV ingestion of page-performance exports

pub mod csv_reader;

pub use csv_reader::{parse_csv_content, parse_csv_line, read_csv_file, split_records};
