use super::*;
use std::collections::HashMap;

fn obj(pairs: &[(&str, JsonValue)]) -> JsonValue {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v.clone());
    }
    JsonValue::Object(map)
}

#[test]
fn test_parse_scalars() {
    assert_eq!(parse("null").unwrap(), JsonValue::Null);
    assert_eq!(parse("true").unwrap(), JsonValue::Bool(true));
    assert_eq!(parse("false").unwrap(), JsonValue::Bool(false));
    assert_eq!(parse("0").unwrap(), JsonValue::Number(0.0));
    assert_eq!(parse("-12.5e2").unwrap(), JsonValue::Number(-1250.0));
    assert_eq!(parse("  42  ").unwrap(), JsonValue::Number(42.0));
    assert_eq!(
        parse("\"hi\"").unwrap(),
        JsonValue::String("hi".to_string())
    );
}

#[test]
fn test_parse_containers() {
    assert_eq!(parse("[]").unwrap(), JsonValue::Array(vec![]));
    assert_eq!(
        parse("[1, 2, 3]").unwrap(),
        JsonValue::Array(vec![
            JsonValue::Number(1.0),
            JsonValue::Number(2.0),
            JsonValue::Number(3.0),
        ])
    );
    assert_eq!(parse("{}").unwrap(), JsonValue::Object(HashMap::new()));
    assert_eq!(
        parse(r#"{ "a": [true, null], "b": { "c": "d" } }"#).unwrap(),
        obj(&[
            (
                "a",
                JsonValue::Array(vec![JsonValue::Bool(true), JsonValue::Null])
            ),
            ("b", obj(&[("c", JsonValue::from("d"))])),
        ])
    );
}

#[test]
fn test_duplicate_keys_last_writer_wins() {
    let v = parse(r#"{ "a": 1, "a": 2 }"#).unwrap();
    assert_eq!(v, obj(&[("a", JsonValue::Number(2.0))]));
}

#[test]
fn test_parse_rejects() {
    let bad = [
        "",
        "nul",
        "{",
        "[1, 2, ]",
        "00",
        "01",
        "1e",
        "1.",
        "\"\\uZZZZ\"",
        "{ 123: \"x\" }",
        "[1 2]",
        "{\"a\": 1,}",
        "\"unterminated",
        "truefalse",
        "1 2",
    ];
    for input in bad {
        assert!(parse(input).is_err(), "expected parse error for {input:?}");
    }
}

#[test]
fn test_parse_error_position() {
    let err = parse("[1, x]").unwrap_err();
    assert_eq!(err.position, 4);
    assert!(err.reason.contains("unexpected character"));
}

#[test]
fn test_string_escapes() {
    let v = parse(r#""a\"b\\c\/d\n\t\u0041""#).unwrap();
    assert_eq!(v, JsonValue::String("a\"b\\c/d\n\tA".to_string()));

    // One, two and three byte forms of \u.
    assert_eq!(parse(r#""\u0024""#).unwrap(), JsonValue::from("$"));
    assert_eq!(parse(r#""\u00a2""#).unwrap(), JsonValue::from("\u{a2}"));
    assert_eq!(parse(r#""\u20ac""#).unwrap(), JsonValue::from("\u{20ac}"));
}

#[test]
fn test_serialize_compact() {
    assert_eq!(to_string(&JsonValue::Null), "null");
    assert_eq!(to_string(&JsonValue::Bool(true)), "true");
    assert_eq!(to_string(&JsonValue::Number(1.5)), "1.5");
    assert_eq!(to_string(&JsonValue::Number(30.0)), "30");
    assert_eq!(to_string(&JsonValue::from("a\"b")), r#""a\"b""#);
    assert_eq!(
        to_string(&JsonValue::Array(vec![
            JsonValue::Number(1.0),
            JsonValue::Null
        ])),
        "[1,null]"
    );
    assert_eq!(to_string(&obj(&[("k", JsonValue::from("v"))])), r#"{"k":"v"}"#);
}

#[test]
fn test_serialize_control_chars() {
    let v = JsonValue::from("\u{0001}\u{0008}\u{001f}");
    assert_eq!(to_string(&v), r#""\u0001\b\u001f""#);
}

#[test]
fn test_serialize_pretty() {
    let v = obj(&[("a", JsonValue::Array(vec![JsonValue::Number(1.0)]))]);
    let pretty = to_pretty_string(&v, 2);
    assert_eq!(pretty, "{\n  \"a\": [\n    1\n  ]\n}");

    // Empty containers stay on one line.
    assert_eq!(to_pretty_string(&JsonValue::Array(vec![]), 2), "[]");
    assert_eq!(
        to_pretty_string(&JsonValue::Object(HashMap::new()), 2),
        "{}"
    );
}

#[test]
fn test_object_view() {
    let v = parse(r#"{ "name": "Alice", "age": 30, "admin": true }"#).unwrap();
    let view = JsonObjectView::new(&v).unwrap();

    assert!(view.has("name"));
    assert!(!view.has("email"));
    assert_eq!(view.get_string("name").unwrap(), "Alice");
    assert_eq!(view.get_number("age").unwrap(), 30.0);
    assert!(view.get_bool("admin").unwrap());

    assert_eq!(
        view.get_string("age"),
        Err(JsonAccessError::TypeMismatch {
            key: "age".to_string(),
            expected: JsonType::String,
        })
    );
    assert_eq!(
        view.get_number("email"),
        Err(JsonAccessError::MissingKey("email".to_string()))
    );
    assert_eq!(view.get_optional_string("email"), None);
    assert_eq!(view.get_optional_string("age"), None);
    assert_eq!(view.get_optional_number("age"), Some(30.0));

    assert!(matches!(
        JsonObjectView::new(&JsonValue::Null),
        Err(JsonAccessError::NotAnObject)
    ));
}

#[test]
fn test_object_view_mut() {
    let mut v = parse("{}").unwrap();
    {
        let mut view = JsonObjectViewMut::new(&mut v).unwrap();
        view.set("flag", true);
        view.set("count", 3.0);
        view.set("name", "x");
        view.set("nested", parse("[1]").unwrap());
        view.erase("count");
    }
    let view = JsonObjectView::new(&v).unwrap();
    assert!(view.get_bool("flag").unwrap());
    assert!(!view.has("count"));
    assert_eq!(view.get_string("name").unwrap(), "x");
    assert_eq!(view.get_array("nested").unwrap().len(), 1);
}

#[test]
fn test_schema_validation() {
    let schema = [
        FieldRequirement::required("name", JsonType::String),
        FieldRequirement::required("age", JsonType::Number),
        FieldRequirement::optional("admin", JsonType::Bool),
    ];

    let ok = parse(r#"{ "name": "Alice", "age": 30, "admin": true }"#).unwrap();
    assert_eq!(validate_object_schema(&ok, &schema), Ok(()));

    let no_admin = parse(r#"{ "name": "Alice", "age": 30 }"#).unwrap();
    assert_eq!(validate_object_schema(&no_admin, &schema), Ok(()));

    let missing = parse(r#"{ "name": "Alice" }"#).unwrap();
    let err = validate_object_schema(&missing, &schema).unwrap_err();
    assert!(err.contains("missing"), "got: {err}");
    assert!(err.contains("age"));

    let wrong = parse(r#"{ "name": "Alice", "age": "30" }"#).unwrap();
    let err = validate_object_schema(&wrong, &schema).unwrap_err();
    assert!(err.contains("wrong type"), "got: {err}");

    let extra = parse(r#"{ "name": "A", "age": 1, "extra": [] }"#).unwrap();
    assert_eq!(validate_object_schema(&extra, &schema), Ok(()));

    assert!(validate_object_schema(&JsonValue::Null, &schema).is_err());
}
