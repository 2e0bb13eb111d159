//! Tool registry and built-in tools for vitalis.

mod blood_pressure;
mod registry;
mod tool;

pub use blood_pressure::{
    readings, summarize, BloodPressureTool, Reading, ReadingSummary, TOOL_NAME, USER_ID_ARG,
};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolError};

use std::sync::Arc;

/// Registry holding every tool the assistant declares to the model.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(BloodPressureTool::new()));
    registry
}
