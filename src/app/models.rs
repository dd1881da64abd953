use crate::json::JsonValue;
use std::collections::HashMap;

/// One checked point, exactly as the client submitted it plus the verdict.
///
/// Coordinates stay textual so no precision is lost between the request,
/// the hit check and the stored history.
#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub x: String,
    pub y: String,
    pub r: String,
    pub hit: bool,
    pub exec_time_ms: i64,
    pub timestamp: String,
}

impl Dot {
    pub fn to_json(&self) -> JsonValue {
        let mut obj = HashMap::new();
        obj.insert("x".to_string(), JsonValue::from(self.x.as_str()));
        obj.insert("y".to_string(), JsonValue::from(self.y.as_str()));
        obj.insert("r".to_string(), JsonValue::from(self.r.as_str()));
        obj.insert("hit".to_string(), JsonValue::Bool(self.hit));
        obj.insert("execTime".to_string(), JsonValue::from(self.exec_time_ms));
        obj.insert("time".to_string(), JsonValue::from(self.timestamp.as_str()));
        JsonValue::Object(obj)
    }
}

/// Unit of work for the background write queue.
#[derive(Debug, Clone, PartialEq)]
pub struct DbTask {
    pub login: String,
    pub dot: Dot,
}
