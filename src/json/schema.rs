use super::value::{JsonType, JsonValue};

/// One field expectation for [`validate_object_schema`].
#[derive(Debug, Clone)]
pub struct FieldRequirement {
    pub name: String,
    pub ty: JsonType,
    pub optional: bool,
}

impl FieldRequirement {
    pub fn required(name: &str, ty: JsonType) -> Self {
        FieldRequirement {
            name: name.to_string(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: &str, ty: JsonType) -> Self {
        FieldRequirement {
            name: name.to_string(),
            ty,
            optional: true,
        }
    }
}

/// Check an object against a flat field schema.
///
/// Required fields must be present with the expected variant; optional
/// fields may be absent but must match the type when present. Extra fields
/// are allowed. The error message names the first offending field.
pub fn validate_object_schema(
    value: &JsonValue,
    schema: &[FieldRequirement],
) -> Result<(), String> {
    let map = match value {
        JsonValue::Object(map) => map,
        _ => return Err("value is not an object".to_string()),
    };

    for field in schema {
        match map.get(&field.name) {
            None => {
                if !field.optional {
                    return Err(format!("missing required field: {}", field.name));
                }
            }
            Some(found) => {
                if found.json_type() != field.ty {
                    return Err(format!("field '{}' has wrong type", field.name));
                }
            }
        }
    }
    Ok(())
}
