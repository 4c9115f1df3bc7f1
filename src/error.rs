//! Error types.
//!
//! Two layers:
//!
//! - [`GenError`] is returned by the generation engine (config validation,
//!   curve fitting, graph traversal). It separates "fix your configuration"
//!   from "the numbers degenerated".
//! - [`AppError`] is what the binary reports: a message plus a process exit code.

/// Errors raised by the generation engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenError {
    /// The configuration is malformed or references something that does not exist.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The configuration was accepted but the numerics degenerated.
    #[error("Computation error: {0}")]
    Computation(String),
}

impl GenError {
    pub fn config(message: impl Into<String>) -> Self {
        GenError::Config(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        GenError::Computation(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, GenError::Config(_))
    }
}

pub type GenResult<T> = Result<T, GenError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<GenError> for AppError {
    fn from(err: GenError) -> Self {
        let exit_code = match err {
            GenError::Config(_) => 2,
            GenError::Computation(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_errors_map_to_exit_codes() {
        let cfg: AppError = GenError::config("bad boundary").into();
        assert_eq!(cfg.exit_code(), 2);
        assert!(cfg.to_string().contains("bad boundary"));

        let comp: AppError = GenError::computation("zero range").into();
        assert_eq!(comp.exit_code(), 4);
    }
}
