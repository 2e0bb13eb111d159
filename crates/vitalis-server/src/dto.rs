use serde::{Deserialize, Deserializer, Serialize};
use vitalis_core::DEFAULT_USER_ID;

// === HTTP DTOs ===

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Absent: `None`. Explicit `null`: `Some(None)`.
    #[serde(rename = "userId", default, deserialize_with = "present")]
    pub user_id: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl ChatRequest {
    /// The caller's user id; the shared default only when the field is absent.
    ///
    /// An explicit `null` becomes the empty id, which the tool reports as missing.
    pub fn user_id(&self) -> &str {
        match &self.user_id {
            None => DEFAULT_USER_ID,
            Some(None) => "",
            Some(Some(id)) => id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{ "message": "hi" }"#).unwrap();
        assert_eq!(req.user_id(), "default-user");

        let req: ChatRequest = serde_json::from_str(r#"{ "message": "hi", "userId": "u7" }"#).unwrap();
        assert_eq!(req.user_id(), "u7");

        let req: ChatRequest = serde_json::from_str(r#"{ "message": "hi", "userId": "" }"#).unwrap();
        assert_eq!(req.user_id(), "");
    }

    #[test]
    fn test_null_user_id_is_not_defaulted() {
        let req: ChatRequest = serde_json::from_str(r#"{ "message": "hi", "userId": null }"#).unwrap();
        assert_eq!(req.user_id, Some(None));
        assert_eq!(req.user_id(), "");

        assert!(serde_json::from_str::<ChatRequest>(r#"{ "message": "hi", "userId": 7 }"#).is_err());
    }
}
