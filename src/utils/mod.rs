pub mod error;
pub mod format;
pub mod output;

pub use error::{AppError, AppResult, report_error};
