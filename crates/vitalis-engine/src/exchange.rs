//! Single-hop tool-calling exchange with the model.
//!
//! ```text
//! AwaitingModelResponse ──function call──▶ ToolRequested ──tool + 2nd request──▶ Done
//!          │                                                                    ▲
//!          └───────────────text──────────▶ DirectAnswer ─────────────────────────┘
//! ```
//!
//! A function call in the second response is never followed; its text (possibly
//! empty) is the final answer.

use serde_json::{json, Map, Value};
use tracing::{info, warn};
use vitalis_core::{ChatError, LlmError};
use vitalis_llm::{
    Content, ContentRole, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest,
    GenerateResponse, GenerativeModel, Part, RetryPolicy, Sleeper,
};
use vitalis_tools::{ToolRegistry, USER_ID_ARG};

/// One tool invocation made while answering a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub name: String,
    /// Arguments as executed, after the server-side user id injection.
    pub args: Map<String, Value>,
    pub result: Value,
}

/// Where an exchange currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeState {
    AwaitingModelResponse,
    ToolRequested(FunctionCall),
    DirectAnswer(String),
    Done(String),
}

/// Result of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOutcome {
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub model_calls: u32,
}

/// Drives one user message through at most two model calls.
pub struct ToolExchange<'a> {
    model: &'a dyn GenerativeModel,
    tools: &'a ToolRegistry,
    retry: RetryPolicy,
    sleeper: &'a dyn Sleeper,
    user_id: &'a str,
    functions: Vec<FunctionDeclaration>,
    contents: Vec<Content>,
    state: ExchangeState,
    tool_calls: Vec<ToolCallRecord>,
    model_calls: u32,
}

impl<'a> ToolExchange<'a> {
    pub fn new(
        model: &'a dyn GenerativeModel,
        tools: &'a ToolRegistry,
        retry: RetryPolicy,
        sleeper: &'a dyn Sleeper,
        user_id: &'a str,
        contents: Vec<Content>,
    ) -> Self {
        Self {
            model,
            tools,
            retry,
            sleeper,
            user_id,
            functions: tools.declarations(),
            contents,
            state: ExchangeState::AwaitingModelResponse,
            tool_calls: Vec::new(),
            model_calls: 0,
        }
    }

    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    /// Runs the exchange to `Done`.
    pub async fn run(mut self) -> Result<ExchangeOutcome, ChatError> {
        loop {
            if let ExchangeState::Done(text) = &self.state {
                return Ok(ExchangeOutcome {
                    text: text.clone(),
                    tool_calls: self.tool_calls,
                    model_calls: self.model_calls,
                });
            }
            self.step().await?;
        }
    }

    /// Advances by one transition. A no-op once `Done`.
    pub async fn step(&mut self) -> Result<(), ChatError> {
        let current = std::mem::replace(&mut self.state, ExchangeState::AwaitingModelResponse);

        self.state = match current {
            ExchangeState::AwaitingModelResponse => {
                let response = self.generate().await?;
                match response.function_call() {
                    Some(call) => ExchangeState::ToolRequested(call.clone()),
                    None => ExchangeState::DirectAnswer(response.text()),
                }
            }
            ExchangeState::ToolRequested(call) => {
                let result = self.execute_tool(&call).await?;
                self.contents.push(Content {
                    role: ContentRole::Model,
                    parts: vec![Part::FunctionCall { function_call: call.clone() }],
                });
                self.contents.push(Content {
                    role: ContentRole::Function,
                    parts: vec![Part::FunctionResponse {
                        function_response: FunctionResponse {
                            name: call.name,
                            response: json!({ "content": result }),
                        },
                    }],
                });

                let response = self.generate().await?;
                if let Some(chained) = response.function_call() {
                    warn!("Ignoring chained tool call after tool result: {}", chained.name);
                }
                ExchangeState::Done(response.text())
            }
            ExchangeState::DirectAnswer(text) => ExchangeState::Done(text),
            done @ ExchangeState::Done(_) => done,
        };

        Ok(())
    }

    async fn generate(&mut self) -> Result<GenerateResponse, ChatError> {
        self.model_calls += 1;
        let request = GenerateRequest {
            contents: self.contents.clone(),
            functions: self.functions.clone(),
        };
        let model = self.model;
        let response = self
            .retry
            .run(self.sleeper, || model.generate(&request))
            .await?;

        if let Some(reason) = response.block_reason() {
            warn!("Model response blocked: {}", reason);
            return Err(LlmError::Blocked(reason).into());
        }
        Ok(response)
    }

    async fn execute_tool(&mut self, call: &FunctionCall) -> Result<Value, ChatError> {
        let mut args = call.args.clone();
        args.insert(USER_ID_ARG.to_string(), Value::String(self.user_id.to_string()));

        let shown = Value::Object(args.clone());
        info!("Executing tool: {} {}", call.name, shown);
        // Exact-name dispatch: an undeclared name fails the request instead of
        // falling back to the blood-pressure tool.
        let result = self
            .tools
            .dispatch(&call.name, &args)
            .await
            .map_err(|e| ChatError::Tool(e.to_string()))?;

        self.tool_calls.push(ToolCallRecord {
            name: call.name.clone(),
            args,
            result: result.clone(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use vitalis_llm::TokioSleeper;

    struct Replay(Mutex<Vec<GenerateResponse>>);

    #[async_trait]
    impl GenerativeModel for Replay {
        async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
            let mut queue = self.0.lock().unwrap();
            match queue.is_empty() {
                true => Err(LlmError::EmptyResponse),
                false => Ok(queue.remove(0)),
            }
        }
    }

    fn exchange<'a>(model: &'a Replay, tools: &'a ToolRegistry) -> ToolExchange<'a> {
        ToolExchange::new(
            model,
            tools,
            RetryPolicy::new(0, Duration::ZERO),
            &TokioSleeper,
            "u1",
            vec![Content::user_text("hi")],
        )
    }

    #[tokio::test]
    async fn test_direct_answer_transitions() {
        let model = Replay(Mutex::new(vec![GenerateResponse::from_text("hello")]));
        let tools = vitalis_tools::default_registry();
        let mut ex = exchange(&model, &tools);

        assert_eq!(ex.state(), &ExchangeState::AwaitingModelResponse);
        ex.step().await.unwrap();
        assert_eq!(ex.state(), &ExchangeState::DirectAnswer("hello".into()));
        ex.step().await.unwrap();
        assert_eq!(ex.state(), &ExchangeState::Done("hello".into()));
        ex.step().await.unwrap();
        assert_eq!(ex.state(), &ExchangeState::Done("hello".into()));
    }

    #[tokio::test]
    async fn test_tool_requested_transitions() {
        let mut args = Map::new();
        args.insert("userId".into(), json!("someone-else"));
        let model = Replay(Mutex::new(vec![
            GenerateResponse::from_function_call("getBloodPressureData", args),
            GenerateResponse::from_text("done"),
        ]));
        let tools = vitalis_tools::default_registry();
        let mut ex = exchange(&model, &tools);

        ex.step().await.unwrap();
        assert!(matches!(ex.state(), ExchangeState::ToolRequested(c) if c.name == "getBloodPressureData"));

        ex.step().await.unwrap();
        assert_eq!(ex.state(), &ExchangeState::Done("done".into()));
        assert_eq!(ex.tool_calls[0].args["userId"], "u1");
        assert_eq!(ex.tool_calls[0].result["userId"], "u1");
        assert_eq!(ex.contents.len(), 3);
        assert_eq!(ex.contents[2].role, ContentRole::Function);
    }
}
