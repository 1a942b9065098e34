use thiserror::Error;

/// Unified error type for the Toolgate proxy.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Missing '{0}' field")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No plugin handles tool: {0}")]
    UnknownTool(String),

    #[error("Policy denied")]
    PolicyDenied,

    #[error("No credential for {tool} on {resource}")]
    NoCredential { tool: String, resource: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal: {0}")]
    Internal(String),
}

impl GateError {
    /// Map to HTTP status code.
    ///
    /// Bad inputs at the proxy boundary are 4xx; everything else is a
    /// server-side failure.
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::MissingField(_) => 400,
            GateError::InvalidRequest(_) => 400,
            GateError::UnknownTool(_) => 400,
            GateError::PolicyDenied => 403,
            GateError::NoCredential { .. } => 403,
            _ => 500,
        }
    }
}
