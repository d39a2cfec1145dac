pub mod record_parser;
pub mod tdv_reader;

pub use record_parser::{NumericPolicy, ParsedRecord, RecordParser};
pub use tdv_reader::{FileReport, LineError, TdvReader};
