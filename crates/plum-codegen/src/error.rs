use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unknown vendor: {0}")]
    UnknownVendor(String),

    #[error("unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("未找到 {table} 中的 {type_name} 数据")]
    TypeNotFound { table: String, type_name: String },

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("structure {id} lookup failed: {reason}")]
    Fetch { id: String, reason: String },

    #[error("vendor {0} does not parse rendered documents")]
    DocumentUnsupported(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GenerateError {
    /// Shorthand for a missing or mistyped payload field.
    pub fn shape(what: impl Into<String>) -> Self {
        Self::UnexpectedShape(what.into())
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
