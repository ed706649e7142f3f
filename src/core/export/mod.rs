// Snapshot exporters

pub mod csv_logger;

pub use csv_logger::{format_rows, resolve_path, CsvLogger, CSV_HEADER};
