use super::value::{JsonType, JsonValue};
use std::collections::HashMap;
use std::fmt;

/// Error raised by typed object access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonAccessError {
    /// The wrapped value is not an object.
    NotAnObject,
    /// The requested key is absent.
    MissingKey(String),
    /// The key exists but holds a different variant.
    TypeMismatch { key: String, expected: JsonType },
}

impl fmt::Display for JsonAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonAccessError::NotAnObject => write!(f, "value is not an object"),
            JsonAccessError::MissingKey(key) => write!(f, "missing key '{key}'"),
            JsonAccessError::TypeMismatch { key, expected } => {
                write!(f, "wrong type for '{key}': expected {expected}")
            }
        }
    }
}

impl std::error::Error for JsonAccessError {}

macro_rules! typed_getter {
    ($name:ident, $optional:ident, $ret:ty, $variant:path, $ty:expr, $conv:expr) => {
        #[doc = concat!("Fetch `key` as ", stringify!($ret), ".")]
        pub fn $name(&self, key: &str) -> Result<$ret, JsonAccessError> {
            match self.at(key)? {
                $variant(inner) => Ok($conv(inner)),
                _ => Err(JsonAccessError::TypeMismatch {
                    key: key.to_string(),
                    expected: $ty,
                }),
            }
        }

        #[doc = "Like the typed getter, but absent keys and wrong types both return `None`."]
        pub fn $optional(&self, key: &str) -> Option<$ret> {
            self.$name(key).ok()
        }
    };
}

/// Read-only typed view over a JSON object.
///
/// Typed getters fail with [`JsonAccessError::TypeMismatch`] when the stored
/// variant differs from the requested type; the `optional` variants never
/// fail and treat both missing keys and mismatched types as absence.
pub struct JsonObjectView<'a> {
    map: &'a HashMap<String, JsonValue>,
}

impl<'a> JsonObjectView<'a> {
    pub fn new(value: &'a JsonValue) -> Result<Self, JsonAccessError> {
        match value {
            JsonValue::Object(map) => Ok(JsonObjectView { map }),
            _ => Err(JsonAccessError::NotAnObject),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// The raw value under `key`.
    pub fn at(&self, key: &str) -> Result<&'a JsonValue, JsonAccessError> {
        self.map
            .get(key)
            .ok_or_else(|| JsonAccessError::MissingKey(key.to_string()))
    }

    /// Like [`Self::at`] but `None` when absent.
    pub fn get_value(&self, key: &str) -> Option<&'a JsonValue> {
        self.map.get(key)
    }

    typed_getter!(get_bool, get_optional_bool, bool, JsonValue::Bool, JsonType::Bool, |b: &bool| *b);
    typed_getter!(
        get_number,
        get_optional_number,
        f64,
        JsonValue::Number,
        JsonType::Number,
        |n: &f64| *n
    );
    typed_getter!(
        get_string,
        get_optional_string,
        &'a str,
        JsonValue::String,
        JsonType::String,
        |s: &'a String| s.as_str()
    );
    typed_getter!(
        get_array,
        get_optional_array,
        &'a [JsonValue],
        JsonValue::Array,
        JsonType::Array,
        |a: &'a Vec<JsonValue>| a.as_slice()
    );
    typed_getter!(
        get_object,
        get_optional_object,
        &'a HashMap<String, JsonValue>,
        JsonValue::Object,
        JsonType::Object,
        |o: &'a HashMap<String, JsonValue>| o
    );
}

/// Mutable typed view over a JSON object: set-by-type and erase.
pub struct JsonObjectViewMut<'a> {
    map: &'a mut HashMap<String, JsonValue>,
}

impl<'a> JsonObjectViewMut<'a> {
    pub fn new(value: &'a mut JsonValue) -> Result<Self, JsonAccessError> {
        match value {
            JsonValue::Object(map) => Ok(JsonObjectViewMut { map }),
            _ => Err(JsonAccessError::NotAnObject),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn at_mut(&mut self, key: &str) -> Result<&mut JsonValue, JsonAccessError> {
        self.map
            .get_mut(key)
            .ok_or_else(|| JsonAccessError::MissingKey(key.to_string()))
    }

    /// Insert or replace `key`. Accepts anything convertible to a value:
    /// booleans, numbers, strings, arrays, objects or values themselves.
    pub fn set(&mut self, key: &str, value: impl Into<JsonValue>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub fn erase(&mut self, key: &str) {
        self.map.remove(key);
    }
}
