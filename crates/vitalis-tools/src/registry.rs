//! Registry for tool implementations.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;
use vitalis_llm::FunctionDeclaration;

use crate::tool::{Tool, ToolError};

/// Name → handler lookup for the tools declared to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name, replacing any previous one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!("registering tool (name={})", tool.name());
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations for every registered tool, sorted by name.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        let mut decls: Vec<_> = self.tools.values().map(|t| t.declaration()).collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }

    /// Runs the tool registered under exactly `name`.
    pub async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its arguments"
        }

        fn parameters(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
            Ok(Value::Object(args.clone()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_exact_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let mut args = Map::new();
        args.insert("k".into(), json!("v"));

        let out = registry.dispatch("echo", &args).await.unwrap();
        assert_eq!(out, json!({ "k": "v" }));

        let err = registry.dispatch("Echo", &args).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "Echo"));
    }

    #[test]
    fn test_declarations() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(EchoTool));

        let decls = registry.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "echo");
        assert_eq!(decls[0].description, "echoes its arguments");
    }
}
