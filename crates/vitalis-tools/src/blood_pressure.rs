//! Blood-pressure history lookup backed by a fixed 2025 reading log.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::tool::{Tool, ToolError};

pub const TOOL_NAME: &str = "getBloodPressureData";
pub const USER_ID_ARG: &str = "userId";

const READING_LOG: [(&str, u16, u16, u16); 24] = [
    ("2025-01-05", 118, 78, 72),
    ("2025-01-20", 122, 80, 75),
    ("2025-02-12", 125, 82, 68),
    ("2025-02-25", 120, 79, 70),
    ("2025-03-08", 119, 77, 74),
    ("2025-03-22", 121, 81, 71),
    ("2025-04-10", 124, 83, 73),
    ("2025-04-28", 118, 76, 69),
    ("2025-05-15", 117, 75, 72),
    ("2025-05-30", 120, 78, 76),
    ("2025-06-11", 122, 80, 70),
    ("2025-06-25", 126, 84, 74),
    ("2025-07-04", 123, 81, 75),
    ("2025-07-19", 121, 79, 72),
    ("2025-08-05", 119, 78, 71),
    ("2025-08-20", 120, 80, 73),
    ("2025-09-12", 122, 82, 68),
    ("2025-09-28", 118, 77, 70),
    ("2025-10-03", 125, 85, 77),
    ("2025-10-21", 121, 80, 74),
    ("2025-11-09", 123, 81, 72),
    ("2025-11-24", 119, 78, 70),
    ("2025-12-10", 126, 83, 75),
    ("2025-12-25", 122, 80, 71),
];

/// One dated cuff measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub date: String,
    /// Systolic pressure, mmHg.
    pub sys: u16,
    /// Diastolic pressure, mmHg.
    pub dia: u16,
    /// Pulse, beats per minute.
    pub pul: u16,
}

/// The fixed reading log, oldest first.
pub fn readings() -> Vec<Reading> {
    READING_LOG
        .iter()
        .map(|&(date, sys, dia, pul)| Reading { date: date.to_string(), sys, dia, pul })
        .collect()
}

/// Mean values over a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSummary {
    pub count: usize,
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,
}

/// Averages `readings`; `None` when there is nothing to average.
pub fn summarize(readings: &[Reading]) -> Option<ReadingSummary> {
    if readings.is_empty() {
        return None;
    }
    let n = readings.len() as f64;
    let mean = |f: fn(&Reading) -> u16| readings.iter().map(|r| f64::from(f(r))).sum::<f64>() / n;

    Some(ReadingSummary {
        count: readings.len(),
        systolic: mean(|r| r.sys),
        diastolic: mean(|r| r.dia),
        pulse: mean(|r| r.pul),
    })
}

/// Returns the caller's blood-pressure history.
///
/// The log is not user-specific: any non-empty user id receives the full list.
#[derive(Debug, Default, Clone, Copy)]
pub struct BloodPressureTool;

impl BloodPressureTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for BloodPressureTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch the user's blood-pressure history for statistical analysis. \
         Call this function directly to obtain the data; never answer with a code block."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "userId": { "type": "string", "description": "The user's unique id" }
            },
            "required": [USER_ID_ARG]
        })
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let user_id = args
            .get(USER_ID_ARG)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());

        let Some(user_id) = user_id else {
            return Ok(json!({ "status": "error", "message": "user id is required" }));
        };

        let data = serde_json::to_value(readings())
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        Ok(json!({ "status": "success", "userId": user_id, "data": data }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[tokio::test]
    async fn test_any_user_gets_full_log() {
        let tool = BloodPressureTool::new();

        for id in ["default-user", "u-42", "someone-unregistered"] {
            let out = tool.call(&args(&[(USER_ID_ARG, json!(id))])).await.unwrap();
            assert_eq!(out["status"], "success");
            assert_eq!(out["userId"], id);

            let data: Vec<Reading> = serde_json::from_value(out["data"].clone()).unwrap();
            assert_eq!(data, readings());
        }
    }

    #[tokio::test]
    async fn test_missing_user_id_is_an_error_payload() {
        let tool = BloodPressureTool::new();

        for a in [args(&[]), args(&[(USER_ID_ARG, json!(""))]), args(&[(USER_ID_ARG, json!(7))])] {
            let out = tool.call(&a).await.unwrap();
            assert_eq!(out["status"], "error");
            assert!(out.get("data").is_none());
        }
    }

    #[test]
    fn test_log_shape() {
        let log = readings();
        assert_eq!(log.len(), 24);
        assert_eq!(log[0].date, "2025-01-05");
        assert_eq!(log[23], Reading { date: "2025-12-25".into(), sys: 122, dia: 80, pul: 71 });
        assert!(log.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_summary_of_fixed_log() {
        let summary = summarize(&readings()).unwrap();
        assert_eq!(summary.count, 24);
        assert!((summary.systolic - 2911.0 / 24.0).abs() < 1e-9);
        assert!((summary.diastolic - 1917.0 / 24.0).abs() < 1e-9);
        assert!((summary.pulse - 1732.0 / 24.0).abs() < 1e-9);
        assert_eq!(summary.systolic.round(), 121.0);
        assert_eq!(summary.diastolic.round(), 80.0);

        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_declaration_requires_user_id() {
        let decl = BloodPressureTool.declaration();
        assert_eq!(decl.name, TOOL_NAME);
        assert_eq!(decl.parameters["required"], json!(["userId"]));
    }
}
