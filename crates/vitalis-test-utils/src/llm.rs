use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use vitalis_core::LlmError;
use vitalis_llm::{GenerateRequest, GenerateResponse, GenerativeModel, Part};
use vitalis_tools::{summarize, Reading, TOOL_NAME};

type Responder = dyn Fn(&GenerateRequest) -> Result<GenerateResponse, LlmError> + Send + Sync;

/// Model that replays queued responses, then falls back to a responder.
///
/// Every request is recorded for later inspection.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<GenerateResponse, LlmError>>>,
    responder: Option<Box<Responder>>,
    latency: Option<Duration>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<GenerateResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            responder: None,
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Model that always answers through `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&GenerateRequest) -> Result<GenerateResponse, LlmError> + Send + Sync + 'static,
    {
        Self { responder: Some(Box::new(responder)), ..Self::new(vec![]) }
    }

    /// Model that answers every request with the same text.
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::responding(move |_| Ok(GenerateResponse::from_text(text.clone())))
    }

    /// Delay every response, letting concurrent callers interleave.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.responder) {
            (Some(scripted), _) => scripted,
            (None, Some(responder)) => responder(request),
            (None, None) => Err(LlmError::EmptyResponse),
        }
    }
}

pub fn rate_limited() -> LlmError {
    LlmError::RateLimited("RESOURCE_EXHAUSTED".into())
}

/// Response requesting a function call with the given arguments.
pub fn function_call(name: &str, args: Value) -> GenerateResponse {
    let args: Map<String, Value> = match args {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    GenerateResponse::from_function_call(name, args)
}

/// Tool output carried by the last turn of a request, if it is a function result.
pub fn last_function_result(request: &GenerateRequest) -> Option<&Value> {
    request.contents.last()?.parts.iter().find_map(|p| match p {
        Part::FunctionResponse { function_response } => function_response.response.get("content"),
        _ => None,
    })
}

/// Responder that behaves like a model analysing blood-pressure data.
///
/// First turn: asks for the reading log (guessing a user id). With a tool
/// result: averages successful data, or reports the tool's error without
/// computing anything.
pub fn blood_pressure_analyst(
    request: &GenerateRequest,
) -> Result<GenerateResponse, LlmError> {
    let Some(result) = last_function_result(request) else {
        return Ok(function_call(TOOL_NAME, json!({ "userId": "model-guess" })));
    };

    if result["status"] != "success" {
        let message = result["message"].as_str().unwrap_or("unknown error");
        return Ok(GenerateResponse::from_text(format!(
            "I could not retrieve your readings ({message})."
        )));
    }

    let readings: Vec<Reading> = serde_json::from_value(result["data"].clone())?;
    let text = match summarize(&readings) {
        Some(s) => format!(
            "Across {} readings your average blood pressure is {:.0}/{:.0} mmHg with a pulse of {:.0} bpm.",
            s.count, s.systolic, s.diastolic, s.pulse
        ),
        None => "You have no readings yet.".to_string(),
    };
    Ok(GenerateResponse::from_text(text))
}
