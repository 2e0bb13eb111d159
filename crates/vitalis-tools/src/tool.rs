//! Tool trait definition.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use vitalis_llm::FunctionDeclaration;

/// Errors raised while dispatching or running a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model asked for a tool nobody registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments could not be interpreted.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// A locally executed function the model may call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &str;
    /// Human-readable description shown to the model.
    fn description(&self) -> &str;
    /// JSON schema for the arguments object.
    fn parameters(&self) -> Value;

    /// Invoke the tool. Domain-level failures belong in the returned payload.
    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError>;

    /// Declaration sent to the model.
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
