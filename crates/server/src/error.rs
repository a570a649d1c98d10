//! Structured errors for tool parameter handling.
//!
//! Domain failures come from `fireguide_core::Error`; these cover what the
//! tool layer itself rejects.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the guide server's tool layer.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A direction parameter outside its allowed values.
    #[error("INVALID_INPUT: {param} must be one of {expected}, got '{value}'")]
    InvalidDirection { param: &'static str, expected: &'static str, value: String },

    /// Tool output could not be serialized.
    #[error("OUTPUT_FAILED: {0}")]
    Output(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidDirection { .. } => -32602,
            ToolError::Output(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
