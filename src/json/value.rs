use rand::Rng;
use std::collections::HashMap;

/// Tag identifying which variant a [`JsonValue`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JsonType::Null => "null",
            JsonType::Bool => "bool",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A JSON value: one of the six RFC 8259 variants.
///
/// Numbers are IEEE-754 doubles. Object keys are unordered; inserting a
/// duplicate key overwrites the previous value (last writer wins).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(HashMap<String, JsonValue>),
}

impl JsonValue {
    /// The variant tag of this value.
    pub fn json_type(&self) -> JsonType {
        match self {
            JsonValue::Null => JsonType::Null,
            JsonValue::Bool(_) => JsonType::Bool,
            JsonValue::Number(_) => JsonType::Number,
            JsonValue::String(_) => JsonType::String,
            JsonValue::Array(_) => JsonType::Array,
            JsonValue::Object(_) => JsonType::Object,
        }
    }

    /// True when this is an object containing `key`.
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            JsonValue::Object(map) => map.contains_key(key),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, JsonValue>> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compact serialization; see [`crate::json::to_string`].
    pub fn to_json_string(&self) -> String {
        super::writer::to_string(self)
    }

    /// Pretty serialization; see [`crate::json::to_pretty_string`].
    pub fn to_pretty_json_string(&self, indent_step: usize) -> String {
        super::writer::to_pretty_string(self, indent_step)
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<f64> for JsonValue {
    fn from(n: f64) -> Self {
        JsonValue::Number(n)
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        JsonValue::Number(n as f64)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(items: Vec<JsonValue>) -> Self {
        JsonValue::Array(items)
    }
}

impl From<HashMap<String, JsonValue>> for JsonValue {
    fn from(map: HashMap<String, JsonValue>) -> Self {
        JsonValue::Object(map)
    }
}

/// Generate a random value of bounded depth for round-trip testing.
///
/// Containers stop appearing at depth 3, strings are printable ASCII and
/// object keys are short lowercase words, so every generated value
/// serializes and re-parses losslessly.
pub fn random_json<R: Rng>(rng: &mut R, depth: u32) -> JsonValue {
    let max_kind = if depth >= 3 { 3 } else { 5 };
    match rng.gen_range(0..=max_kind) {
        0 => JsonValue::Null,
        1 => JsonValue::Bool(rng.gen_bool(0.5)),
        2 => JsonValue::Number(rng.gen_range(-1.0e6..1.0e6)),
        3 => {
            let len = rng.gen_range(0..=16);
            let s: String = (0..len)
                .map(|_| rng.gen_range(32u8..=126) as char)
                .collect();
            JsonValue::String(s)
        }
        4 => {
            let len = rng.gen_range(0..=6);
            JsonValue::Array((0..len).map(|_| random_json(rng, depth + 1)).collect())
        }
        _ => {
            let len = rng.gen_range(0..=6);
            let mut map = HashMap::new();
            for _ in 0..len {
                let klen = rng.gen_range(1..=8);
                let key: String = (0..klen)
                    .map(|_| rng.gen_range(b'a'..=b'z') as char)
                    .collect();
                map.insert(key, random_json(rng, depth + 1));
            }
            JsonValue::Object(map)
        }
    }
}
