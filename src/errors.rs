use thiserror::Error;

/// Errors raised by the text and configuration front ends.
///
/// Evaluation itself never fails: malformed predicates evaluate to
/// `ThreeValuedLogic::Unknown` instead.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid cfg setting: {0}")]
    InvalidSetting(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
