use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub fn report_error(err: &AppError) {
    match err {
        AppError::Network(msg) => {
            println!("🌐 {}", OutputStyle::error(&format!("Network: {}", msg)));
        }
        AppError::Llm(msg) => {
            println!("🤖 {}", OutputStyle::error(&format!("LLM: {}", msg)));
        }
        AppError::Parse(msg) => {
            println!("⚠️  {}", OutputStyle::warning(&format!("Parse: {}", msg)));
        }
        AppError::Dispatch(msg) => {
            eprintln!("❌ {}", OutputStyle::error(&format!("Dispatch: {}", msg)));
        }
        AppError::Io(e) => {
            eprintln!("❌ {}", OutputStyle::error(e));
        }
        AppError::Config(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}
