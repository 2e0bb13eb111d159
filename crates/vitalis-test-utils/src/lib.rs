//! Test helpers shared across vitalis crates.

pub mod llm;
pub mod retrieval;
pub mod sleep;

pub use llm::{
    blood_pressure_analyst, function_call, last_function_result, rate_limited, ScriptedModel,
};
pub use retrieval::{FailingRetriever, StaticRetriever};
pub use sleep::RecordingSleeper;
