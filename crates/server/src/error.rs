//! Errors raised by the tool layer itself, as opposed to the router.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the precache server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool output could not be serialized.
    #[error("OUTPUT_ERROR: {0}")]
    Output(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::Output(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_error_code() {
        let err: McpError = ToolError::Output("bad".into()).into();
        assert_eq!(err.code.0, -32603);
        assert!(err.message.contains("OUTPUT_ERROR"));
    }
}
