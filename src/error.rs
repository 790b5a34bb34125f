//! Crate-wide error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown tool: '{0}'")]
    ToolNotFound(String),

    #[error("Unknown resource: '{0}'")]
    ResourceNotFound(String),

    #[error("Invalid arguments for '{param}': {source}")]
    InvalidArguments {
        param: String,
        source: serde_json::Error,
    },

    #[error("Missing parameter: {0}")]
    MissingParam(&'static str),

    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("duplicate resource uri: {0}")]
    DuplicateResource(String),

    #[error("Cart {0} not found")]
    CartNotFound(String),

    #[error("Product {product_id} not found in cart {cart_id}")]
    CartItemNotFound { cart_id: String, product_id: String },

    #[error("Cart {0} would exceed the largest supported quantity or amount")]
    CartLimitExceeded(String),

    #[error("upstream catalog error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// JSON-RPC error code used when this error terminates a request.
    pub fn rpc_code(&self) -> i32 {
        match self {
            AppError::ToolNotFound(_)
            | AppError::InvalidArguments { .. }
            | AppError::MissingParam(_) => -32602,
            AppError::ResourceNotFound(_) => -32002,
            AppError::Cancelled => -32800,
            _ => -32603,
        }
    }

    /// Errors raised by a tool's own logic. These are reported back to the
    /// client inside the result envelope with `isError: true` instead of as a
    /// protocol error.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            AppError::CartNotFound(_)
                | AppError::CartItemNotFound { .. }
                | AppError::CartLimitExceeded(_)
                | AppError::Upstream(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
