pub mod reader;
pub mod writer;

pub use reader::{string_record_to_vec, CsvStreamReader, CsvTable};
pub use writer::{write_table, CsvStreamWriter};
