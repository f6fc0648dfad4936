pub mod label;
pub mod log_record;

pub use label::LabelSnapshot;
pub use log_record::{LogId, LogRecord};
