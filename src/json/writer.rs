use super::value::JsonValue;

/// Serialize compactly: no whitespace between tokens.
pub fn to_string(value: &JsonValue) -> String {
    let mut out = String::new();
    write_compact(value, &mut out);
    out
}

/// Serialize with `indent_step` spaces per nesting level.
///
/// Every nested element goes on its own line; object values follow the key
/// as `"key": value`. Empty arrays and objects stay on one line.
pub fn to_pretty_string(value: &JsonValue, indent_step: usize) -> String {
    let mut out = String::new();
    write_pretty(value, &mut out, 0, indent_step);
    out
}

/// Quote and escape a string for JSON output.
///
/// Escapes the mandatory set (`"` `\` and the control shorthands) and every
/// other control character below 0x20 as `\u00XX`.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Shortest decimal form that round-trips through an f64.
fn format_number(n: f64) -> String {
    n.to_string()
}

fn write_compact(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        JsonValue::Number(n) => out.push_str(&format_number(*n)),
        JsonValue::String(s) => out.push_str(&escape_string(s)),
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        JsonValue::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&escape_string(key));
                out.push(':');
                write_compact(item, out);
            }
            out.push('}');
        }
    }
}

fn write_pretty(value: &JsonValue, out: &mut String, indent: usize, indent_step: usize) {
    match value {
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => {
            write_compact(value, out);
        }
        JsonValue::Array(items) => {
            out.push('[');
            if !items.is_empty() {
                out.push('\n');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    out.extend(std::iter::repeat(' ').take(indent + indent_step));
                    write_pretty(item, out, indent + indent_step, indent_step);
                }
                out.push('\n');
                out.extend(std::iter::repeat(' ').take(indent));
            }
            out.push(']');
        }
        JsonValue::Object(map) => {
            out.push('{');
            if !map.is_empty() {
                out.push('\n');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    out.extend(std::iter::repeat(' ').take(indent + indent_step));
                    out.push_str(&escape_string(key));
                    out.push_str(": ");
                    write_pretty(item, out, indent + indent_step, indent_step);
                }
                out.push('\n');
                out.extend(std::iter::repeat(' ').take(indent));
            }
            out.push('}');
        }
    }
}
