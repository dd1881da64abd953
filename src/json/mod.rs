//! # JSON Module
//!
//! A self-contained JSON codec: a tagged value tree, a recursive-descent
//! parser, compact and pretty writers, typed object views and a small
//! schema validator.
//!
//! ## Overview
//!
//! [`JsonValue`] covers the six RFC 8259 variants. Numbers are IEEE-754
//! doubles; integers beyond 2^53 lose precision on ingest, which is an
//! accepted design decision for this codec. Object keys are unordered and
//! duplicate keys resolve last-writer-wins.
//!
//! Parsing is strict: leading zeros, trailing commas, non-string keys,
//! unterminated constructs and trailing garbage are all rejected with a
//! [`ParseError`] carrying the byte position. `\uXXXX` escapes decode to
//! UTF-8 without combining surrogate pairs.
//!
//! ## Example
//!
//! ```
//! use quadrant::json::{self, JsonObjectView, JsonValue};
//!
//! let value = json::parse(r#"{ "name": "Alice", "age": 30 }"#).unwrap();
//! let view = JsonObjectView::new(&value).unwrap();
//! assert_eq!(view.get_string("name").unwrap(), "Alice");
//! assert_eq!(view.get_number("age").unwrap(), 30.0);
//! assert_eq!(json::parse(&json::to_string(&value)).unwrap(), value);
//! ```

mod parser;
mod schema;
#[cfg(test)]
mod tests;
mod value;
mod view;
mod writer;

pub use parser::{parse, JsonParser, ParseError};
pub use schema::{validate_object_schema, FieldRequirement};
pub use value::{random_json, JsonType, JsonValue};
pub use view::{JsonAccessError, JsonObjectView, JsonObjectViewMut};
pub use writer::{escape_string, to_pretty_string, to_string};
