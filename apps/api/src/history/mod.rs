pub mod handlers;
pub mod log;

pub use log::{HistoryLimits, HistoryLog, HistoryRecord};
