//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vitalis_core::{Role, Turn};

/// Role tag on a content turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    #[default]
    Model,
    /// Carries a tool result back to the model.
    Function,
}

/// One role-tagged turn sent to or received from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: ContentRole,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: ContentRole::User, parts: vec![Part::text(text)] }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: ContentRole::Model, parts: vec![Part::text(text)] }
    }

    /// Concatenated text of every text part.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First function-call part, if any.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.parts.iter().find_map(|p| match p {
            Part::FunctionCall { function_call } => Some(function_call),
            _ => None,
        })
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            Role::User => Content::user_text(turn.text.clone()),
            Role::Model => Content::model_text(turn.text.clone()),
        }
    }
}

/// A single part of a content turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Part kinds this service never produces (inline data, code execution, ...).
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

/// Structured request from the model to invoke a named function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Function output fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// Declared tool schema the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Provider-agnostic generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub functions: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

/// Why the provider refused the prompt itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Finish reasons that mean the candidate's content was withheld.
const BLOCKING_FINISH_REASONS: [&str; 5] =
    ["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Decoded `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// Response whose first candidate is a plain text reply.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_content(Content::model_text(text))
    }

    /// Response whose first candidate requests a function call.
    pub fn from_function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self::from_content(Content {
            role: ContentRole::Model,
            parts: vec![Part::FunctionCall {
                function_call: FunctionCall { name: name.into(), args },
            }],
        })
    }

    pub fn from_content(content: Content) -> Self {
        Self {
            candidates: vec![Candidate { content: Some(content), finish_reason: Some("STOP".into()) }],
            prompt_feedback: None,
            usage_metadata: None,
        }
    }

    /// Reason the provider blocked this response, if it did.
    ///
    /// A blocked prompt wins over the first candidate's finish reason.
    pub fn block_reason(&self) -> Option<String> {
        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
            return Some(format!("prompt blocked ({reason})"));
        }
        let finish = self.candidates.first()?.finish_reason.as_deref()?;
        BLOCKING_FINISH_REASONS
            .contains(&finish)
            .then(|| format!("finish reason {finish}"))
    }

    /// Content of the first candidate.
    pub fn content(&self) -> Option<&Content> {
        self.candidates.first().and_then(|c| c.content.as_ref())
    }

    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.content().and_then(Content::function_call)
    }

    /// Text of the first candidate, empty when there is none.
    pub fn text(&self) -> String {
        self.content().map(Content::text).unwrap_or_default()
    }
}
